//! Token kinds and token records.

use std::ops::Range;

/// Selector token kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokenKind {
    Space,
    /// A run of `+ > ~ |` characters.
    Combinator,
    Asterisk,
    Ampersand,
    Bang,
    Comma,
    Equals,
    Dollar,
    Caret,
    OpenSquare,
    CloseSquare,
    Colon,
    Semicolon,
    OpenParen,
    CloseParen,
    Slash,
    Str,
    Comment,
    Word,
}

impl TokenKind {
    /// Fixed text for single-character tokens.
    pub fn lexeme(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Asterisk => "*",
            TokenKind::Ampersand => "&",
            TokenKind::Bang => "!",
            TokenKind::Comma => ",",
            TokenKind::Equals => "=",
            TokenKind::Dollar => "$",
            TokenKind::Caret => "^",
            TokenKind::OpenSquare => "[",
            TokenKind::CloseSquare => "]",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Slash => "/",
            TokenKind::Space
            | TokenKind::Combinator
            | TokenKind::Str
            | TokenKind::Comment
            | TokenKind::Word => return None,
        })
    }

    /// Whitespace and comments separate meaningful tokens.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Comment)
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Space => "space",
            TokenKind::Combinator => "combinator",
            TokenKind::Asterisk => "asterisk",
            TokenKind::Ampersand => "ampersand",
            TokenKind::Bang => "bang",
            TokenKind::Comma => "comma",
            TokenKind::Equals => "equals",
            TokenKind::Dollar => "dollar",
            TokenKind::Caret => "caret",
            TokenKind::OpenSquare => "open square bracket",
            TokenKind::CloseSquare => "close square bracket",
            TokenKind::Colon => "colon",
            TokenKind::Semicolon => "semicolon",
            TokenKind::OpenParen => "open parenthesis",
            TokenKind::CloseParen => "close parenthesis",
            TokenKind::Slash => "slash",
            TokenKind::Str => "string",
            TokenKind::Comment => "comment",
            TokenKind::Word => "word",
        }
    }
}

/// A token with its position.
///
/// Lines and columns are 1-based and the end position names the token's
/// last byte. `start_pos..end_pos` is the half-open byte range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub start_pos: u32,
    pub end_pos: u32,
}

impl Token {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start_pos as usize..self.end_pos as usize
    }

    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range()]
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end_pos - self.start_pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end_pos == self.start_pos
    }
}
