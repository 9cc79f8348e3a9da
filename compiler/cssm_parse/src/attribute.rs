//! Attribute selector parsing: `[ns|name op "value" i]`.

use cssm_diagnostic::Diagnostic;
use cssm_ir::{
    unescape, unescape_string, Attribute, AttributeSpaces, Escaped, Namespace, NodeKind,
    QuoteMark, Spaces,
};
use cssm_lexer::TokenKind;

use crate::escape_error;
use crate::parser::Parser;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Field {
    Namespace,
    Attribute,
    Operator,
    Value,
    Insensitive,
}

/// Source text of a field and the text printed for it (which also holds
/// inline comments).
#[derive(Default)]
struct FieldText {
    source: String,
    printed: String,
    offset: u32,
}

impl FieldText {
    fn new(text: &str, offset: u32) -> Self {
        FieldText {
            source: text.to_owned(),
            printed: text.to_owned(),
            offset,
        }
    }

    fn push(&mut self, text: &str) {
        self.source.push_str(text);
        self.printed.push_str(text);
    }

    fn into_escaped(self) -> Result<Escaped, Diagnostic> {
        let value = unescape(&self.source).map_err(|err| escape_error(self.offset, err))?;
        Ok(Escaped::with_raw(value.into_owned(), self.printed))
    }
}

#[derive(Default)]
struct ValueText {
    logical: String,
    printed: String,
}

#[derive(Default)]
struct AttributeBuilder {
    namespace: Option<FieldText>,
    /// Set once the `|` after the namespace prefix has been read.
    namespace_closed: bool,
    attribute: Option<FieldText>,
    operator: Option<FieldText>,
    value: Option<ValueText>,
    quote_mark: Option<QuoteMark>,
    insensitive: Option<bool>,
    insensitive_raw: Option<String>,
    spaces: AttributeSpaces,
    last_added: Option<Field>,
    /// Whitespace before the first field.
    space_before: String,
    /// Whitespace since the last field.
    space_after: bool,
}

fn unexpected_token(content: &str, offset: u32) -> Diagnostic {
    Diagnostic::unexpected(format!("Unexpected \"{content}\" found."), offset)
}

fn operator_defined(offset: u32) -> Diagnostic {
    Diagnostic::unexpected(
        "Unexpected \"=\" found; an operator was already defined.",
        offset,
    )
}

impl AttributeBuilder {
    fn spaces_mut(&mut self, field: Field) -> Option<&mut Spaces> {
        match field {
            Field::Namespace => None,
            Field::Attribute => Some(&mut self.spaces.attribute),
            Field::Operator => Some(&mut self.spaces.operator),
            Field::Value => Some(&mut self.spaces.value),
            Field::Insensitive => Some(&mut self.spaces.insensitive),
        }
    }

    /// Append text to the printed form of `field` only.
    fn push_printed(&mut self, field: Field, text: &str) {
        let printed = match field {
            Field::Namespace => self.namespace.as_mut().map(|f| &mut f.printed),
            Field::Attribute => self.attribute.as_mut().map(|f| &mut f.printed),
            Field::Operator => self.operator.as_mut().map(|f| &mut f.printed),
            Field::Value => self.value.as_mut().map(|v| &mut v.printed),
            Field::Insensitive => self.spaces_mut(field).map(|s| &mut s.after),
        };
        if let Some(printed) = printed {
            printed.push_str(text);
        }
    }

    fn start_namespace(&mut self, prefix: &str, offset: u32) {
        self.spaces.attribute.before = std::mem::take(&mut self.space_before);
        self.namespace = Some(FieldText::new(prefix, offset));
        self.last_added = Some(Field::Namespace);
    }

    fn set_operator(&mut self, content: &str, offset: u32) -> Result<(), Diagnostic> {
        if self.attribute.is_none() {
            return Err(Diagnostic::unexpected("Expected an attribute.", offset));
        }
        if self.value.is_some() || self.operator.is_some() {
            return Err(operator_defined(offset));
        }
        self.operator = Some(FieldText::new(content, offset));
        self.last_added = Some(Field::Operator);
        Ok(())
    }

    fn finish(self, close_offset: u32) -> Result<Attribute, Diagnostic> {
        let Some(attribute) = self.attribute else {
            return Err(Diagnostic::unexpected("Expected an attribute.", close_offset));
        };
        if self.operator.is_some() && self.value.is_none() {
            return Err(Diagnostic::unexpected(
                "Expected a value after the attribute operator.",
                close_offset,
            ));
        }
        let namespace = match self.namespace {
            Some(ns) if ns.source.is_empty() && ns.printed.is_empty() => Some(Namespace::Empty),
            Some(ns) => Some(Namespace::Named(ns.into_escaped()?)),
            None => None,
        };
        Ok(Attribute {
            namespace,
            attribute: attribute.into_escaped()?,
            operator: self.operator.map(FieldText::into_escaped).transpose()?,
            value: self
                .value
                .map(|value| Escaped::with_raw(value.logical, value.printed)),
            quote_mark: self.quote_mark,
            insensitive: self.insensitive.unwrap_or(false),
            insensitive_raw: self.insensitive_raw,
            spaces: self.spaces,
        })
    }
}

impl Parser<'_> {
    pub(crate) fn attribute(&mut self) -> Result<(), Diagnostic> {
        let open = self.cursor.position();
        let open_offset = self.cursor.offset();
        self.cursor.advance();
        let body_start = self.cursor.position();
        while !self.cursor.check(TokenKind::CloseSquare) {
            if self.cursor.is_at_end() {
                if self.options.safe {
                    return self.unclosed_attribute(open, body_start);
                }
                return Err(Diagnostic::missing_square_bracket(
                    "Expected a closing square bracket.",
                    open_offset,
                ));
            }
            self.cursor.advance();
        }
        let close = self.cursor.position();
        let attribute = self.attribute_body(body_start, close)?;
        self.push_tokens(NodeKind::Attribute(Box::new(attribute)), open, close);
        self.cursor.advance();
        Ok(())
    }

    /// Safe mode: the input ended inside `[`. The body runs to the end and
    /// no `]` is printed.
    fn unclosed_attribute(&mut self, open: usize, body_start: usize) -> Result<(), Diagnostic> {
        let end = self.cursor.len();
        let attribute = self.attribute_body(body_start, end)?;
        let id = self.push_tokens(NodeKind::Attribute(Box::new(attribute)), open, end - 1);
        self.mark_unclosed(id);
        Ok(())
    }

    fn attribute_body(&self, start: usize, end: usize) -> Result<Attribute, Diagnostic> {
        let mut b = AttributeBuilder::default();
        let within = |i: usize| if i < end { self.cursor.kind_at(i) } else { None };

        for i in start..end {
            let Some(kind) = self.cursor.kind_at(i) else {
                break;
            };
            let content = self.cursor.content_at(i);
            let offset = self.cursor.offset_at(i);
            let next = within(i + 1);
            let next_is_pipe =
                next == Some(TokenKind::Combinator) && self.cursor.content_at(i + 1) == "|";

            match kind {
                TokenKind::Space => {
                    b.space_after = true;
                    let space = self.optional_space(content);
                    match b.last_added {
                        Some(Field::Namespace) => {
                            return Err(Diagnostic::unexpected(
                                "Unexpected whitespace after the namespace prefix.",
                                offset,
                            ))
                        }
                        Some(field) => {
                            if let Some(spaces) = b.spaces_mut(field) {
                                spaces.after.push_str(space);
                            }
                        }
                        None => b.space_before.push_str(space),
                    }
                    continue;
                }
                TokenKind::Comment => {
                    match b.last_added {
                        None => b.space_before.push_str(content),
                        Some(Field::Namespace) if b.namespace_closed => {
                            return Err(Diagnostic::unexpected(
                                "Unexpected comment after the namespace separator.",
                                offset,
                            ))
                        }
                        Some(field)
                            if field != Field::Namespace
                                && (b.space_after
                                    || next == Some(TokenKind::Space)
                                    || field == Field::Insensitive) =>
                        {
                            if let Some(spaces) = b.spaces_mut(field) {
                                spaces.after.push_str(content);
                            }
                        }
                        Some(field) => b.push_printed(field, content),
                    }
                    continue;
                }
                TokenKind::Asterisk => {
                    if next == Some(TokenKind::Equals) {
                        b.set_operator(content, offset)?;
                    } else if b.namespace.is_none() && b.attribute.is_none() && next_is_pipe {
                        b.start_namespace(content, offset);
                    } else {
                        return Err(unexpected_token(content, offset));
                    }
                }
                TokenKind::Dollar => {
                    let extends_value = b.last_added == Some(Field::Value)
                        && !b.space_after
                        && b.quote_mark.is_none();
                    if extends_value {
                        if let Some(value) = b.value.as_mut() {
                            value.logical.push_str(content);
                            value.printed.push_str(content);
                        }
                    } else if next == Some(TokenKind::Equals) {
                        b.set_operator(content, offset)?;
                    } else {
                        return Err(unexpected_token(content, offset));
                    }
                }
                TokenKind::Caret => {
                    if next == Some(TokenKind::Equals) {
                        b.set_operator(content, offset)?;
                    } else {
                        return Err(unexpected_token(content, offset));
                    }
                }
                TokenKind::Combinator => match content {
                    "~" | "|" if next == Some(TokenKind::Equals) => {
                        b.set_operator(content, offset)?;
                    }
                    "|" if b.attribute.is_none()
                        && !b.namespace_closed
                        && (b.namespace.is_none() || b.last_added == Some(Field::Namespace)) =>
                    {
                        if b.namespace.is_none() {
                            b.start_namespace("", offset);
                        }
                        b.namespace_closed = true;
                    }
                    _ => return Err(unexpected_token(content, offset)),
                },
                TokenKind::Word => {
                    let starts_namespace = next_is_pipe && within(i + 2) != Some(TokenKind::Equals);
                    if starts_namespace
                        && b.namespace.is_none()
                        && b.attribute.is_none()
                        && b.operator.is_none()
                    {
                        b.start_namespace(content, offset);
                    } else if b.attribute.is_none()
                        || (b.last_added == Some(Field::Attribute) && !b.space_after)
                    {
                        match b.attribute.as_mut() {
                            Some(attribute) => attribute.push(content),
                            None => {
                                if b.namespace.is_none() {
                                    b.spaces.attribute.before = std::mem::take(&mut b.space_before);
                                }
                                b.attribute = Some(FieldText::new(content, offset));
                            }
                        }
                        b.last_added = Some(Field::Attribute);
                    } else if b.value.is_none()
                        || (b.last_added == Some(Field::Value)
                            && !b.space_after
                            && b.quote_mark.is_none())
                    {
                        if b.operator.is_none() {
                            return Err(Diagnostic::unexpected(
                                "Expected an operator before the attribute value.",
                                offset,
                            ));
                        }
                        let logical = unescape(content).map_err(|err| escape_error(offset, err))?;
                        let value = b.value.get_or_insert_with(ValueText::default);
                        value.logical.push_str(&logical);
                        value.printed.push_str(content);
                        b.quote_mark = None;
                        b.last_added = Some(Field::Value);
                    } else if b.insensitive.is_none() && (b.quote_mark.is_some() || b.space_after) {
                        let insensitive = content.eq_ignore_ascii_case("i");
                        b.insensitive = Some(insensitive);
                        if content != "i" {
                            b.insensitive_raw = Some(content.to_owned());
                        }
                        b.last_added = Some(Field::Insensitive);
                    } else {
                        return Err(unexpected_token(content, offset));
                    }
                }
                TokenKind::Str => {
                    if b.attribute.is_none() || b.operator.is_none() {
                        return Err(Diagnostic::unexpected(
                            "Expected an attribute followed by an operator preceding the string.",
                            offset,
                        ));
                    }
                    if b.value.is_some() {
                        return Err(unexpected_token(content, offset));
                    }
                    let quote = content.chars().next().and_then(QuoteMark::from_char);
                    let body = content
                        .get(1..content.len().saturating_sub(1))
                        .unwrap_or_default();
                    b.value = Some(ValueText {
                        logical: unescape_string(body).into_owned(),
                        printed: content.to_owned(),
                    });
                    b.quote_mark = quote;
                    b.last_added = Some(Field::Value);
                }
                TokenKind::Equals => {
                    if b.attribute.is_none() {
                        return Err(Diagnostic::unexpected("Expected an attribute.", offset));
                    }
                    if b.value.is_some() {
                        return Err(operator_defined(offset));
                    }
                    let extends = b.last_added == Some(Field::Operator) && !b.space_after;
                    if let Some(operator) = b.operator.as_mut() {
                        if !extends || operator.source.ends_with('=') {
                            return Err(operator_defined(offset));
                        }
                        operator.push(content);
                    } else {
                        b.operator = Some(FieldText::new(content, offset));
                    }
                    b.last_added = Some(Field::Operator);
                }
                _ => return Err(unexpected_token(content, offset)),
            }
            b.space_after = false;
        }

        b.finish(self.cursor.offset_at(end))
    }
}
