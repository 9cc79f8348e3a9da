//! Selector parser for cssm.
//!
//! Turns a selector list such as `a.b > :not(.c), #d` into a
//! [`SelectorTree`]. Parsing is lossless by default: printing the tree
//! reproduces the input byte for byte, comments and whitespace included.
//!
//! # Modes
//!
//! - **Safe**: an unterminated string or comment is closed instead of
//!   failing.
//! - **Lossy**: insignificant whitespace is dropped and required
//!   whitespace collapses to a single space.

mod attribute;
mod cursor;
mod parser;

use cssm_diagnostic::Diagnostic;
use cssm_ir::{EscapeError, SelectorTree};
use cssm_lexer::Tokenizer;

use crate::parser::Parser;

/// Parser configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub safe: bool,
    pub lossy: bool,
}

impl ParseOptions {
    #[must_use]
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    #[must_use]
    pub fn with_lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }
}

/// Parse a selector list with default options.
pub fn parse(source: &str) -> Result<SelectorTree, Diagnostic> {
    parse_with(source, ParseOptions::default())
}

/// Parse a selector list.
///
/// Diagnostic offsets are byte offsets into `source`.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len(), safe = options.safe, lossy = options.lossy))]
pub fn parse_with(source: &str, options: ParseOptions) -> Result<SelectorTree, Diagnostic> {
    let stream = Tokenizer::new().safe(options.safe).tokenize(source)?;
    if stream.was_repaired() {
        tracing::debug!("closed an unterminated string or comment");
    }
    Parser::new(&stream.source, &stream.tokens, options).parse()
}

pub(crate) fn escape_error(base: u32, err: EscapeError) -> Diagnostic {
    Diagnostic::invalid_escape(base.saturating_add(to_u32(err.offset)))
}

#[inline]
pub(crate) fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
