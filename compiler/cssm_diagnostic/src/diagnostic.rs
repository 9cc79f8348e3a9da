//! The [`Diagnostic`] error type shared by every phase.

use cssm_ir::{LineIndex, Position};

use crate::ErrorCode;

/// An error with a code, a message, and the byte offset it refers to.
///
/// Offsets are relative to the text the failing phase was given. Callers
/// that embed that text in a larger source (a selector inside a stylesheet)
/// shift the offset with [`Diagnostic::offset_by`].
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("error[{code}]: {message}")]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub offset: u32,
    /// File the offset refers to, when known.
    pub file: Option<String>,
    /// Extra context, such as the other side of a conflict.
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>, offset: u32) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            offset,
            file: None,
            notes: Vec::new(),
        }
    }

    /// Unclosed string or comment.
    pub fn unclosed(what: &str, offset: u32) -> Self {
        Self::new(ErrorCode::E0001, format!("Unclosed {what}"), offset)
    }

    pub fn invalid_escape(offset: u32) -> Self {
        Self::new(
            ErrorCode::E0002,
            "Invalid escape sequence in identifier",
            offset,
        )
    }

    pub fn unexpected(message: impl Into<String>, offset: u32) -> Self {
        Self::new(ErrorCode::E1001, message, offset)
    }

    pub fn missing_parenthesis(message: impl Into<String>, offset: u32) -> Self {
        Self::new(ErrorCode::E1002, message, offset)
    }

    pub fn missing_square_bracket(message: impl Into<String>, offset: u32) -> Self {
        Self::new(ErrorCode::E1003, message, offset)
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Shift the offset by `base`, for text embedded at `base` in a larger
    /// source.
    #[must_use]
    pub fn offset_by(mut self, base: u32) -> Self {
        self.offset = self.offset.saturating_add(base);
        self
    }

    /// Line and column of the offset within `source`.
    pub fn position(&self, source: &str) -> Position {
        LineIndex::new(source).position(self.offset)
    }

    /// Render as `file:line:col: error[E####]: message`, one note per line.
    pub fn render(&self, source: &str) -> String {
        use std::fmt::Write;

        let pos = self.position(source);
        let mut out = String::new();
        if let Some(file) = &self.file {
            out.push_str(file);
            out.push(':');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{pos}: {self}");
        for note in &self.notes {
            let _ = write!(out, "\n  note: {note}");
        }
        out
    }
}

#[cfg(test)]
mod tests;
