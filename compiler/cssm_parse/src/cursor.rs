//! Token cursor for navigating the token stream.

use cssm_ir::{Position, SourceSpan};
use cssm_lexer::{Token, TokenKind};

/// Cursor over the tokens of one selector source.
///
/// Token texts borrow from the source, not from the cursor, so they stay
/// usable while the parser mutates its own state.
#[derive(Clone, Copy)]
pub(crate) struct Cursor<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Cursor {
            source,
            tokens,
            pos: 0,
        }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn set_position(&mut self, pos: usize) {
        debug_assert!(
            pos <= self.tokens.len(),
            "cursor position {pos} out of bounds (max {})",
            self.tokens.len()
        );
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Whether the current token is the final one.
    #[inline]
    pub(crate) fn is_last(&self) -> bool {
        self.pos + 1 == self.tokens.len()
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn token(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub(crate) fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> Option<TokenKind> {
        self.kind_at(self.pos)
    }

    #[inline]
    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.kind_at(self.pos + 1)
    }

    #[inline]
    pub(crate) fn prev_kind(&self) -> Option<TokenKind> {
        self.pos.checked_sub(1).and_then(|i| self.kind_at(i))
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Text of the token at `index`, or `""` past the end.
    #[inline]
    pub(crate) fn content_at(&self, index: usize) -> &'a str {
        self.tokens
            .get(index)
            .map_or("", |t| t.text(self.source))
    }

    #[inline]
    pub(crate) fn content(&self) -> &'a str {
        self.content_at(self.pos)
    }

    /// Whether the token after the current one is a lone `|`.
    pub(crate) fn next_is_pipe(&self) -> bool {
        self.peek_kind() == Some(TokenKind::Combinator) && self.content_at(self.pos + 1) == "|"
    }

    /// First token at or after `from` that is not whitespace or a comment.
    pub(crate) fn next_meaningful(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_trivia())
    }

    /// Byte offset of the token at `index`, or the source length past the
    /// end.
    pub(crate) fn offset_at(&self, index: usize) -> u32 {
        self.tokens.get(index).map_or_else(
            || u32::try_from(self.source.len()).unwrap_or(u32::MAX),
            |t| t.start_pos,
        )
    }

    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        self.offset_at(self.pos)
    }

    /// Span covering tokens `first..=last`.
    pub(crate) fn span(&self, first: usize, last: usize) -> SourceSpan {
        let start = self
            .tokens
            .get(first)
            .map(|t| Position::new(t.start_line, t.start_col))
            .unwrap_or_default();
        let end = self
            .tokens
            .get(last)
            .map(|t| Position::new(t.end_line, t.end_col))
            .unwrap_or_default();
        SourceSpan::new(start, end)
    }
}
