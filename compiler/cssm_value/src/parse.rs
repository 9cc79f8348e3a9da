//! Value scanner.
//!
//! A single left-to-right pass. Open functions sit on a stack and are
//! attached to their parent when closed, or at the end of input when they
//! never are.

use cssm_ir::QuoteMark;

use crate::node::{ValueKind, ValueNode};

/// Parse a declaration value.
pub fn parse(input: &str) -> Vec<ValueNode> {
    let mut parser = ValueParser::new(input);
    parser.run();
    parser.finish()
}

#[inline]
fn is_space(b: u8) -> bool {
    b <= b' '
}

fn offset(pos: usize) -> u32 {
    u32::try_from(pos).unwrap_or(u32::MAX)
}

/// `u+` followed by hex digits, `?` and `-`.
fn is_unicode_range(word: &str) -> bool {
    let bytes = word.as_bytes();
    bytes.len() > 2
        && matches!(bytes[0], b'u' | b'U')
        && bytes[1] == b'+'
        && bytes[2..]
            .iter()
            .all(|&b| b.is_ascii_hexdigit() || b == b'?' || b == b'-')
}

/// Position of the first `needle` at or after `from` that is not
/// preceded by an odd run of backslashes.
fn find_unescaped(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    let mut start = from;
    while let Some(found) = memchr::memchr(needle, bytes.get(start..)?) {
        let at = start + found;
        let backslashes = bytes[from..at]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 0 {
            return Some(at);
        }
        start = at + 1;
    }
    None
}

struct ValueParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    root: Vec<ValueNode>,
    /// Functions whose `)` has not been seen yet.
    open: Vec<ValueNode>,
    /// Word waiting for its `(`.
    name: String,
    /// Whitespace before the next divider.
    before: String,
    /// Whitespace before the next `)`.
    after: String,
}

impl<'a> ValueParser<'a> {
    fn new(src: &'a str) -> Self {
        ValueParser {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            root: Vec::new(),
            open: Vec::new(),
            name: String::new(),
            before: String::new(),
            after: String::new(),
        }
    }

    fn byte(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    fn tokens(&mut self) -> &mut Vec<ValueNode> {
        match self.open.last_mut().and_then(ValueNode::nodes_mut) {
            Some(nodes) => nodes,
            None => &mut self.root,
        }
    }

    /// Inside `calc(`, matched by exact name: `CALC(` parses like any
    /// other function.
    fn in_calc(&self) -> bool {
        self.open
            .last()
            .is_some_and(|f| matches!(f.kind, ValueKind::Function { .. }) && f.value == "calc")
    }

    fn skip_spaces(&self, from: usize) -> usize {
        let mut next = from;
        while self.byte(next).is_some_and(is_space) {
            next += 1;
        }
        next
    }

    fn run(&mut self) {
        while let Some(b) = self.byte(self.pos) {
            match b {
                _ if is_space(b) => self.space(),
                b'\'' | b'"' => self.string(b),
                b'/' if self.byte(self.pos + 1) == Some(b'*') => self.comment(),
                b'/' | b'*' if self.in_calc() => {
                    let value = &self.src[self.pos..=self.pos];
                    let node = ValueNode::word(value).at(offset(self.pos));
                    self.tokens().push(node);
                    self.pos += 1;
                }
                b'/' | b',' | b':' | b'*' => self.divider(),
                b'(' => self.open_paren(),
                b')' if !self.open.is_empty() => self.close_paren(),
                _ => self.word(),
            }
        }
    }

    fn space(&mut self) {
        let src = self.src;
        let start = self.pos;
        let next = self.skip_spaces(start);
        let token = &src[start..next];
        let following = self.byte(next);
        let in_calc = self.in_calc();
        let divider_follows = matches!(following, Some(b',' | b':'))
            || (following == Some(b'/') && self.byte(next + 1) != Some(b'*') && !in_calc)
            || (following == Some(b'*') && !in_calc);
        self.pos = next;

        if following == Some(b')') && !self.open.is_empty() {
            self.after = token.to_owned();
            return;
        }
        if let Some(ValueNode {
            kind: ValueKind::Div { after, .. },
            ..
        }) = self.tokens().last_mut()
        {
            after.push_str(token);
            return;
        }
        if divider_follows {
            self.before = token.to_owned();
        } else {
            let node = ValueNode::space(token).at(offset(start));
            self.tokens().push(node);
        }
    }

    fn string(&mut self, quote_byte: u8) {
        let start = self.pos;
        let quote = if quote_byte == b'\'' {
            QuoteMark::Single
        } else {
            QuoteMark::Double
        };
        let (end, unclosed) = match find_unescaped(self.bytes, start + 1, quote_byte) {
            Some(end) => (end, false),
            None => (self.src.len(), true),
        };
        let node = ValueNode::new(
            ValueKind::String { quote, unclosed },
            &self.src[start + 1..end],
        )
        .at(offset(start));
        self.tokens().push(node);
        self.pos = end + 1;
    }

    fn comment(&mut self) {
        let start = self.pos;
        let body = start + 2;
        let (end, unclosed) = match memchr::memmem::find(&self.bytes[body..], b"*/") {
            Some(found) => (body + found, false),
            None => (self.src.len(), true),
        };
        let node = ValueNode::new(ValueKind::Comment { unclosed }, &self.src[body..end])
            .at(offset(start));
        self.tokens().push(node);
        self.pos = end + 2;
    }

    fn divider(&mut self) {
        let before = std::mem::take(&mut self.before);
        let start = self.pos - before.len();
        let value = &self.src[self.pos..=self.pos];
        let node = ValueNode::div(value, before, "").at(offset(start));
        self.tokens().push(node);
        self.pos += 1;
    }

    fn open_paren(&mut self) {
        let open = self.pos;
        let next = self.skip_spaces(open + 1);
        let name = std::mem::take(&mut self.name);
        let source_index = offset(open - name.len());
        let before = self.src[open + 1..next].to_owned();
        self.pos = next;

        let quoted = matches!(self.byte(next), Some(b'\'' | b'"'));
        if name == "url" && !quoted {
            self.url(name, before, open, source_index);
            return;
        }

        let function = ValueNode::new(
            ValueKind::Function {
                before,
                after: String::new(),
                nodes: Vec::new(),
                unclosed: false,
            },
            name,
        )
        .at(source_index);
        self.open.push(function);
    }

    /// Unquoted `url(...)` content is one word, read up to the first
    /// unescaped `)`.
    fn url(&mut self, name: String, before: String, open: usize, source_index: u32) {
        let content = self.pos;
        let (close, unclosed) = match find_unescaped(self.bytes, content, b')') {
            Some(close) => (close, false),
            None => (self.src.len(), true),
        };

        // Last non-space byte before the close; the `(` bounds the search.
        let mut last = close - 1;
        while last > open && is_space(self.bytes[last]) {
            last -= 1;
        }

        let mut nodes = Vec::new();
        let mut after = String::new();
        if open < last {
            nodes.push(ValueNode::word(&self.src[content..=last]).at(offset(content)));
            let trailing = &self.src[last + 1..close];
            if unclosed && !trailing.is_empty() {
                nodes.push(ValueNode::space(trailing).at(offset(last + 1)));
            } else {
                after.push_str(trailing);
            }
        }

        let function = ValueNode::new(
            ValueKind::Function {
                before,
                after,
                nodes,
                unclosed,
            },
            name,
        )
        .at(source_index);
        self.tokens().push(function);
        self.pos = close + 1;
    }

    fn close_paren(&mut self) {
        self.pos += 1;
        let after = std::mem::take(&mut self.after);
        if let Some(mut function) = self.open.pop() {
            if let ValueKind::Function { after: slot, .. } = &mut function.kind {
                *slot = after;
            }
            self.tokens().push(function);
        }
    }

    fn word(&mut self) {
        let start = self.pos;
        let balanced = !self.open.is_empty();
        let mut next = start;
        loop {
            if self.bytes[next] == b'\\' {
                next += 1;
            }
            next = (next + 1).min(self.bytes.len());
            let Some(b) = self.byte(next) else {
                break;
            };
            let ends = is_space(b)
                || matches!(b, b'\'' | b'"' | b',' | b':' | b'/' | b'(' | b'*')
                || (b == b')' && balanced);
            if ends {
                break;
            }
        }
        // A backslash may have skipped into a multi-byte character.
        while !self.src.is_char_boundary(next) {
            next += 1;
        }

        let token = &self.src[start..next];
        if self.byte(next) == Some(b'(') {
            self.name = token.to_owned();
        } else {
            let kind = if is_unicode_range(token) {
                ValueKind::UnicodeRange
            } else {
                ValueKind::Word
            };
            let node = ValueNode::new(kind, token).at(offset(start));
            self.tokens().push(node);
        }
        self.pos = next;
    }

    fn finish(mut self) -> Vec<ValueNode> {
        while let Some(mut function) = self.open.pop() {
            if let ValueKind::Function { unclosed, .. } = &mut function.kind {
                *unclosed = true;
            }
            self.tokens().push(function);
        }
        self.root
    }
}
