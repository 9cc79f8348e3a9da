//! Source positions.
//!
//! Lines and columns are 1-based. Columns count bytes, so a multi-byte
//! character advances the column by its encoded length.

use std::fmt;

/// A line/column pair.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Inclusive start and end positions of a node in its source text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        SourceSpan { start, end }
    }

    /// Extend this span so it ends where `other` ends.
    #[inline]
    #[must_use]
    pub fn to(self, other: SourceSpan) -> Self {
        SourceSpan {
            start: self.start,
            end: other.end,
        }
    }
}

/// Maps byte offsets to [`Position`]s.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            memchr::memchr_iter(b'\n', source.as_bytes())
                .filter_map(|nl| u32::try_from(nl + 1).ok()),
        );
        LineIndex { line_starts }
    }

    /// Position of the byte at `offset`.
    pub fn position(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        Position {
            line: u32::try_from(line + 1).unwrap_or(u32::MAX),
            column: offset - line_start + 1,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
