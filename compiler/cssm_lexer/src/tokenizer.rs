//! Selector tokenizer.
//!
//! Splits a selector into tokens whose byte ranges exactly tile the input.
//! Every byte belongs to exactly one token, so concatenating token texts
//! reproduces the source.

use std::borrow::Cow;

use cssm_diagnostic::Diagnostic;

use crate::char_class::{is_combinator, is_hex, is_space, is_word_delimiter};
use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Tokens together with the text their ranges refer to.
///
/// The text is the input itself unless safe mode had to close an
/// unterminated string or comment, in which case it is the repaired copy.
#[derive(Clone, Debug)]
pub struct TokenStream<'a> {
    pub source: Cow<'a, str>,
    pub tokens: Vec<Token>,
}

impl TokenStream<'_> {
    /// Whether safe mode appended text to the input.
    pub fn was_repaired(&self) -> bool {
        matches!(self.source, Cow::Owned(_))
    }
}

/// Tokenizer configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct Tokenizer {
    safe: bool,
}

struct Unclosed {
    what: &'static str,
    fix: &'static str,
    offset: usize,
}

const MAX_REPAIRS: usize = 4;

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer::default()
    }

    /// In safe mode, an unterminated string or comment is closed with a
    /// synthesized quote or `*/` instead of failing.
    #[must_use]
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn tokenize<'a>(&self, input: &'a str) -> Result<TokenStream<'a>, Diagnostic> {
        let unclosed = match scan(input) {
            Ok(tokens) => {
                return Ok(TokenStream {
                    source: Cow::Borrowed(input),
                    tokens,
                })
            }
            Err(unclosed) => unclosed,
        };
        if !self.safe {
            return Err(unclosed_error(&unclosed));
        }

        let mut repaired = String::with_capacity(input.len() + 2);
        repaired.push_str(input);
        repaired.push_str(unclosed.fix);
        for _ in 0..MAX_REPAIRS {
            match scan(&repaired) {
                Ok(tokens) => {
                    return Ok(TokenStream {
                        source: Cow::Owned(repaired),
                        tokens,
                    })
                }
                Err(again) => repaired.push_str(again.fix),
            }
        }
        Err(unclosed_error(&unclosed))
    }
}

fn unclosed_error(unclosed: &Unclosed) -> Diagnostic {
    Diagnostic::unclosed(
        unclosed.what,
        u32::try_from(unclosed.offset).unwrap_or(u32::MAX),
    )
}

/// Tokenize in strict mode.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Diagnostic> {
    Tokenizer::new().tokenize(input).map(|stream| stream.tokens)
}

fn single_char_kind(b: u8) -> Option<TokenKind> {
    Some(match b {
        b'*' => TokenKind::Asterisk,
        b'&' => TokenKind::Ampersand,
        b'!' => TokenKind::Bang,
        b',' => TokenKind::Comma,
        b'=' => TokenKind::Equals,
        b'$' => TokenKind::Dollar,
        b'^' => TokenKind::Caret,
        b'[' => TokenKind::OpenSquare,
        b']' => TokenKind::CloseSquare,
        b':' => TokenKind::Colon,
        b';' => TokenKind::Semicolon,
        b'(' => TokenKind::OpenParen,
        b')' => TokenKind::CloseParen,
        b'/' => TokenKind::Slash,
        _ => return None,
    })
}

fn scan(source: &str) -> Result<Vec<Token>, Unclosed> {
    let bytes = source.as_bytes();
    let mut cursor = Cursor::new(source);
    let mut lines = LineTracker::default();
    let mut tokens = Vec::with_capacity(source.len() / 2 + 1);

    while !cursor.is_eof() {
        let start = cursor.pos();
        let b = cursor.current();
        let kind = if is_space(b) {
            cursor.eat_while(is_space);
            TokenKind::Space
        } else if is_combinator(b) {
            cursor.eat_while(is_combinator);
            TokenKind::Combinator
        } else if b == b'"' || b == b'\'' {
            scan_string(&mut cursor, b)?;
            TokenKind::Str
        } else if b == b'/' && cursor.peek() == b'*' {
            scan_comment(&mut cursor)?;
            TokenKind::Comment
        } else if let Some(kind) = single_char_kind(b) {
            cursor.advance();
            kind
        } else {
            scan_word(&mut cursor);
            TokenKind::Word
        };
        tokens.push(lines.token(kind, bytes, start, cursor.pos()));
    }

    Ok(tokens)
}

/// Scan a quoted string starting at the opening quote.
fn scan_string(cursor: &mut Cursor<'_>, quote: u8) -> Result<(), Unclosed> {
    let start = cursor.pos();
    cursor.advance();
    loop {
        let rest = cursor.rest();
        let Some(found) = memchr::memchr2(quote, b'\\', rest) else {
            return Err(Unclosed {
                what: "quote",
                fix: if quote == b'"' { "\"" } else { "'" },
                offset: start,
            });
        };
        cursor.set_pos(cursor.pos() + found);
        if cursor.current() == quote {
            cursor.advance();
            return Ok(());
        }
        // Backslash: skip it and the escaped byte.
        cursor.advance();
        cursor.advance_char();
    }
}

/// Scan a comment starting at `/*`.
fn scan_comment(cursor: &mut Cursor<'_>) -> Result<(), Unclosed> {
    let start = cursor.pos();
    cursor.set_pos(start + 2);
    match memchr::memmem::find(cursor.rest(), b"*/") {
        Some(found) => {
            cursor.set_pos(cursor.pos() + found + 2);
            Ok(())
        }
        None => Err(Unclosed {
            what: "comment",
            fix: "*/",
            offset: start,
        }),
    }
}

/// Scan a word up to the next delimiter, consuming escapes whole.
fn scan_word(cursor: &mut Cursor<'_>) {
    while !cursor.is_eof() {
        let b = cursor.current();
        if b == b'\\' {
            scan_escape(cursor);
        } else if is_word_delimiter(b) {
            break;
        } else {
            cursor.advance();
        }
    }
}

/// Consume a backslash and what it escapes.
///
/// A hex escape takes up to six digits and one trailing whitespace byte.
/// Anything else after the backslash is consumed as a single character.
fn scan_escape(cursor: &mut Cursor<'_>) {
    cursor.advance();
    if cursor.is_eof() {
        return;
    }
    if is_hex(cursor.current()) {
        let mut digits = 0;
        while digits < 6 && is_hex(cursor.current()) {
            cursor.advance();
            digits += 1;
        }
        if is_space(cursor.current()) {
            cursor.advance();
        }
    } else {
        cursor.advance_char();
    }
}

/// Tracks line starts while tokens are produced in order.
#[derive(Debug)]
struct LineTracker {
    line: u32,
    line_start: usize,
}

impl Default for LineTracker {
    fn default() -> Self {
        LineTracker {
            line: 1,
            line_start: 0,
        }
    }
}

impl LineTracker {
    fn column(&self, offset: usize) -> u32 {
        u32::try_from(offset - self.line_start + 1).unwrap_or(u32::MAX)
    }

    fn token(&mut self, kind: TokenKind, bytes: &[u8], start: usize, end: usize) -> Token {
        let start_line = self.line;
        let start_col = self.column(start);
        let last = end.saturating_sub(1).max(start);

        for nl in memchr::memchr_iter(b'\n', &bytes[start..last]) {
            self.line += 1;
            self.line_start = start + nl + 1;
        }
        let end_line = self.line;
        let end_col = self.column(last);
        if bytes.get(last) == Some(&b'\n') {
            self.line += 1;
            self.line_start = last + 1;
        }

        Token {
            kind,
            start_line,
            start_col,
            end_line,
            end_col,
            start_pos: u32::try_from(start).unwrap_or(u32::MAX),
            end_pos: u32::try_from(end).unwrap_or(u32::MAX),
        }
    }
}
