//! Stylesheet scanner.
//!
//! Splits source text into blocks and statements. A statement ends at the
//! first `{`, `;`, or `}` outside strings, comments, and brackets; one
//! followed by `{` is a rule, any other is a declaration.

use cssm_diagnostic::Diagnostic;

use super::{AtRule, AtRuleRaws, BlockRaws, Comment, CssNode, Decl, DeclRaws, Rule, Stylesheet};

/// Parse a stylesheet.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse_stylesheet(source: &str) -> Result<Stylesheet, Diagnostic> {
    let mut parser = SheetParser {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    let (nodes, after) = parser.block(None)?;
    Ok(Stylesheet { nodes, after })
}

fn offset(pos: usize) -> u32 {
    u32::try_from(pos).unwrap_or(u32::MAX)
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

fn is_space_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

/// Split `text` into leading whitespace, content, and trailing whitespace.
fn split_spaces(text: &str) -> (&str, &str, &str) {
    let content = text.trim_start_matches(is_space_char);
    let leading = &text[..text.len() - content.len()];
    let trimmed = content.trim_end_matches(is_space_char);
    (leading, trimmed, &content[trimmed.len()..])
}

struct SheetParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl SheetParser<'_> {
    fn byte(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    fn skip_spaces(&self, from: usize) -> usize {
        let mut next = from;
        while self.byte(next).is_some_and(is_space) {
            next += 1;
        }
        next
    }

    /// Nodes up to the `}` closing the block opened at `open`, or to the end
    /// of input for the top level. Returns the trailing whitespace too.
    fn block(&mut self, open: Option<usize>) -> Result<(Vec<CssNode>, String), Diagnostic> {
        let mut nodes = Vec::new();
        let mut before = String::new();
        loop {
            let start = self.pos;
            self.pos = self.skip_spaces(start);
            before.push_str(&self.src[start..self.pos]);

            match self.byte(self.pos) {
                None => {
                    if let Some(open) = open {
                        return Err(Diagnostic::unclosed("block", offset(open)));
                    }
                    return Ok((nodes, before));
                }
                Some(b'}') => {
                    if open.is_none() {
                        return Err(Diagnostic::unexpected(
                            "Unexpected \"}\".",
                            offset(self.pos),
                        ));
                    }
                    self.pos += 1;
                    return Ok((nodes, before));
                }
                // A stray `;` prints as part of the next node's whitespace.
                Some(b';') => {
                    before.push(';');
                    self.pos += 1;
                }
                Some(b'/') if self.byte(self.pos + 1) == Some(b'*') => {
                    let comment = self.comment(std::mem::take(&mut before))?;
                    nodes.push(CssNode::Comment(comment));
                }
                Some(b'@') => {
                    let at = self.at_rule(std::mem::take(&mut before))?;
                    nodes.push(CssNode::AtRule(at));
                }
                Some(_) => {
                    let node = self.statement(std::mem::take(&mut before))?;
                    nodes.push(node);
                }
            }
        }
    }

    fn skip_string(&self, open: usize, quote: u8) -> Result<usize, Diagnostic> {
        let mut pos = open + 1;
        while let Some(b) = self.byte(pos) {
            match b {
                b'\\' => pos += 2,
                _ if b == quote => return Ok(pos + 1),
                _ => pos += 1,
            }
        }
        Err(Diagnostic::unclosed("string", offset(open)))
    }

    fn skip_comment(&self, open: usize) -> Result<usize, Diagnostic> {
        let body = open + 2;
        match memchr::memmem::find(self.bytes.get(body..).unwrap_or_default(), b"*/") {
            Some(found) => Ok(body + found + 2),
            None => Err(Diagnostic::unclosed("comment", offset(open))),
        }
    }

    /// Position of the `{`, `;`, or `}` ending the statement at `from`, or
    /// the end of input.
    fn scan(&self, from: usize) -> Result<usize, Diagnostic> {
        let mut pos = from;
        let mut depth = 0usize;
        while let Some(b) = self.byte(pos) {
            match b {
                b'"' | b'\'' => pos = self.skip_string(pos, b)?,
                b'/' if self.byte(pos + 1) == Some(b'*') => pos = self.skip_comment(pos)?,
                b'\\' => pos += 2,
                b'(' | b'[' => {
                    depth += 1;
                    pos += 1;
                }
                b')' | b']' => {
                    depth = depth.saturating_sub(1);
                    pos += 1;
                }
                b'{' | b'}' | b';' if depth == 0 => return Ok(pos),
                _ => pos += 1,
            }
        }
        Ok(self.src.len())
    }

    fn comment(&mut self, before: String) -> Result<Comment, Diagnostic> {
        let start = self.pos;
        let end = self.skip_comment(start)?;
        self.pos = end;
        Ok(Comment {
            text: self.src[start + 2..end - 2].to_owned(),
            before,
            offset: offset(start),
        })
    }

    fn at_rule(&mut self, before: String) -> Result<AtRule, Diagnostic> {
        let start = self.pos;
        let mut name_end = start + 1;
        while self.byte(name_end).is_some_and(is_name_byte) {
            name_end += 1;
        }
        let end = self.scan(name_end)?;
        let (after_name, params, between) = split_spaces(&self.src[name_end..end]);

        let mut at = AtRule {
            name: self.src[start + 1..name_end].to_owned(),
            params: params.to_owned(),
            nodes: None,
            raws: AtRuleRaws {
                before,
                after_name: after_name.to_owned(),
                between: between.to_owned(),
                after: String::new(),
                semicolon: false,
            },
            offset: offset(start),
        };

        match self.byte(end) {
            Some(b'{') => {
                self.pos = end + 1;
                let (nodes, after) = self.block(Some(end))?;
                at.nodes = Some(nodes);
                at.raws.after = after;
            }
            Some(b';') => {
                self.pos = end + 1;
                at.raws.semicolon = true;
            }
            _ => self.pos = end,
        }
        Ok(at)
    }

    fn statement(&mut self, before: String) -> Result<CssNode, Diagnostic> {
        let start = self.pos;
        let end = self.scan(start)?;
        let text = &self.src[start..end];

        if self.byte(end) == Some(b'{') {
            let (_, selector, between) = split_spaces(text);
            self.pos = end + 1;
            let (nodes, after) = self.block(Some(end))?;
            return Ok(CssNode::Rule(Rule {
                selector: selector.to_owned(),
                nodes,
                raws: BlockRaws {
                    before,
                    between: between.to_owned(),
                    after,
                },
                offset: offset(start),
            }));
        }

        let semicolon = self.byte(end) == Some(b';');
        self.pos = if semicolon { end + 1 } else { end };
        declaration(text, before, semicolon, start).map(CssNode::Decl)
    }
}

fn declaration(text: &str, before: String, semicolon: bool, start: usize) -> Result<Decl, Diagnostic> {
    let Some(colon) = text.find(':') else {
        return Err(Diagnostic::unexpected("Unknown word", offset(start)));
    };
    let prop = text[..colon].trim_end();
    if prop.is_empty() {
        return Err(Diagnostic::unexpected("Unknown word", offset(start)));
    }
    let (leading, value, after) = split_spaces(&text[colon + 1..]);
    let between = &text[prop.len()..=colon + leading.len()];
    let (value, important) = split_important(value);

    Ok(Decl {
        prop: prop.to_owned(),
        value: value.to_owned(),
        important: important.map(str::to_owned),
        raws: DeclRaws {
            before,
            between: between.to_owned(),
            after: after.to_owned(),
            semicolon,
        },
        offset: offset(start),
    })
}

/// Split a trailing `!important`, with the whitespace before it, off a
/// value.
fn split_important(value: &str) -> (&str, Option<&str>) {
    let Some(bang) = value.rfind('!') else {
        return (value, None);
    };
    if !value[bang + 1..].trim_start().eq_ignore_ascii_case("important") {
        return (value, None);
    }
    let head = value[..bang].trim_end();
    (head, Some(&value[head.len()..]))
}
