//! CSS escape handling.
//!
//! Selector identifiers exist in two forms: the logical value a consumer
//! compares against (`.a\.b` names the class `a.b`) and the raw text that
//! appeared in the source. [`Escaped`] keeps both, storing the raw text only
//! when it differs from the logical value.

use std::borrow::Cow;
use std::fmt;

const REPLACEMENT: char = '\u{FFFD}';

/// An escape sequence that cannot be decoded.
///
/// A backslash followed by a line break, or a backslash at the very end of
/// an identifier, has no meaning inside a selector identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("invalid escape sequence at byte {offset}")]
pub struct EscapeError {
    /// Byte offset of the backslash, relative to the unescaped text.
    pub offset: usize,
}

/// Quote character around an attribute value or string.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum QuoteMark {
    Single,
    Double,
}

impl QuoteMark {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteMark::Single),
            '"' => Some(QuoteMark::Double),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            QuoteMark::Single => '\'',
            QuoteMark::Double => '"',
        }
    }
}

fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

fn decode_code_point(cp: u32) -> char {
    if cp == 0 {
        return REPLACEMENT;
    }
    char::from_u32(cp).unwrap_or(REPLACEMENT)
}

/// Decode the escapes in an identifier.
///
/// Hex escapes take up to six digits plus one optional whitespace
/// terminator. Zero, surrogates, and values above U+10FFFF decode to U+FFFD.
/// Any other escaped character stands for itself.
pub fn unescape(text: &str) -> Result<Cow<'_, str>, EscapeError> {
    if !text.contains('\\') {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            None | Some((_, '\n' | '\r' | '\x0c')) => return Err(EscapeError { offset }),
            Some((_, h)) if h.is_ascii_hexdigit() => {
                let mut cp: u32 = 0;
                let mut digits = 0;
                while digits < 6 {
                    let Some(d) = chars.peek().and_then(|&(_, h)| h.to_digit(16)) else {
                        break;
                    };
                    cp = cp * 16 + d;
                    chars.next();
                    digits += 1;
                }
                if chars.peek().is_some_and(|&(_, w)| is_css_whitespace(w)) {
                    chars.next();
                }
                out.push(decode_code_point(cp));
            }
            Some((_, other)) => {
                chars.next();
                out.push(other);
            }
        }
    }
    Ok(Cow::Owned(out))
}

/// Decode the body of a quoted string.
///
/// Unlike identifiers, a backslash before a line break is a line
/// continuation and is dropped together with the break.
pub fn unescape_string(body: &str) -> Cow<'_, str> {
    if !body.contains('\\') {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            None => {}
            Some('\r') => {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('\n' | '\x0c') => {
                chars.next();
            }
            Some(h) if h.is_ascii_hexdigit() => {
                let mut cp: u32 = 0;
                let mut digits = 0;
                while digits < 6 {
                    let Some(d) = chars.peek().and_then(|h| h.to_digit(16)) else {
                        break;
                    };
                    cp = cp * 16 + d;
                    chars.next();
                    digits += 1;
                }
                if chars.peek().copied().is_some_and(is_css_whitespace) {
                    chars.next();
                }
                out.push(decode_code_point(cp));
            }
            Some(other) => {
                chars.next();
                out.push(other);
            }
        }
    }
    Cow::Owned(out)
}

fn push_hex_escape(out: &mut String, c: char) {
    use fmt::Write;
    // Writing into a String cannot fail.
    let _ = write!(out, "\\{:x} ", u32::from(c));
}

/// Serialize a logical value as a CSS identifier.
///
/// Follows the CSSOM "serialize an identifier" algorithm. Non-ASCII
/// characters are kept as they are.
pub fn escape_ident(value: &str) -> Cow<'_, str> {
    let needs_escape = value.char_indices().any(|(i, c)| {
        !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && value.starts_with('-'))
            || (i == 0 && c == '-' && value.len() == 1)
    });
    if !needs_escape {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.char_indices() {
        match c {
            '\0' => out.push(REPLACEMENT),
            '\x01'..='\x1f' | '\x7f' => push_hex_escape(&mut out, c),
            '0'..='9' if i == 0 || (i == 1 && value.starts_with('-')) => {
                push_hex_escape(&mut out, c);
            }
            '-' if i == 0 && value.len() == 1 => out.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => {
                out.push(c);
            }
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    Cow::Owned(out)
}

/// Serialize a logical value as the body of a string quoted with `quote`.
pub fn escape_string(value: &str, quote: QuoteMark) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\0' => out.push(REPLACEMENT),
            '\x01'..='\x1f' | '\x7f' => push_hex_escape(&mut out, c),
            '\\' => out.push_str("\\\\"),
            c if c == quote.as_char() => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// A value with its logical form and, when different, its source form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Escaped {
    value: String,
    raw: Option<String>,
}

impl Escaped {
    /// Take `source` as written and decode its escapes.
    pub fn from_source(source: &str) -> Result<Self, EscapeError> {
        let value = unescape(source)?;
        let raw = (value != source).then(|| source.to_owned());
        Ok(Escaped {
            value: value.into_owned(),
            raw,
        })
    }

    /// A logical identifier, escaped for output as needed.
    pub fn identifier(value: impl Into<String>) -> Self {
        let mut escaped = Escaped::default();
        escaped.set_identifier(value);
        escaped
    }

    /// A value printed exactly as given.
    pub fn verbatim(value: impl Into<String>) -> Self {
        Escaped {
            value: value.into(),
            raw: None,
        }
    }

    /// Pair a logical value with the text that should print for it.
    pub fn with_raw(value: impl Into<String>, raw: impl Into<String>) -> Self {
        let value = value.into();
        let raw = raw.into();
        let raw = (raw != value).then_some(raw);
        Escaped { value, raw }
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The text emitted when printing.
    #[inline]
    pub fn printed(&self) -> &str {
        self.raw.as_deref().unwrap_or(&self.value)
    }

    /// Replace the logical value, recomputing the printed form.
    pub fn set_identifier(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.raw = match escape_ident(&value) {
            Cow::Borrowed(_) => None,
            Cow::Owned(raw) => Some(raw),
        };
        self.value = value;
    }

    /// Append text that means the same in both forms.
    pub fn push_verbatim(&mut self, text: &str) {
        if let Some(raw) = &mut self.raw {
            raw.push_str(text);
        }
        self.value.push_str(text);
    }

    /// Append text to the printed form only, such as an inline comment.
    pub fn push_raw(&mut self, text: &str) {
        let raw = self.raw.get_or_insert_with(|| self.value.clone());
        raw.push_str(text);
    }
}

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.printed())
    }
}
