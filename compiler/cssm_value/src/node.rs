//! Value nodes and their printer.

use std::fmt;

use cssm_ir::QuoteMark;

/// What a value node is, with the data specific to that kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Word,
    Space,
    /// `U+0025-00FF`, `u+4??`
    UnicodeRange,
    /// `value` holds the text between the quotes.
    String {
        quote: QuoteMark,
        unclosed: bool,
    },
    /// `value` holds the text between `/*` and `*/`.
    Comment { unclosed: bool },
    /// `,` `:` `/` or `*`, with the whitespace around it.
    Div { before: String, after: String },
    /// `value` is the function name; `before` and `after` are the
    /// whitespace just inside the parentheses.
    Function {
        before: String,
        after: String,
        nodes: Vec<ValueNode>,
        unclosed: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueNode {
    pub kind: ValueKind,
    pub value: String,
    /// Byte offset of the node in the parsed text.
    pub source_index: u32,
}

impl ValueNode {
    pub fn new(kind: ValueKind, value: impl Into<String>) -> Self {
        ValueNode {
            kind,
            value: value.into(),
            source_index: 0,
        }
    }

    pub fn word(value: impl Into<String>) -> Self {
        Self::new(ValueKind::Word, value)
    }

    pub fn space(value: impl Into<String>) -> Self {
        Self::new(ValueKind::Space, value)
    }

    pub fn div(value: impl Into<String>, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self::new(
            ValueKind::Div {
                before: before.into(),
                after: after.into(),
            },
            value,
        )
    }

    pub fn function(name: impl Into<String>, nodes: Vec<ValueNode>) -> Self {
        Self::new(
            ValueKind::Function {
                before: String::new(),
                after: String::new(),
                nodes,
                unclosed: false,
            },
            name,
        )
    }

    #[must_use]
    pub fn at(mut self, source_index: u32) -> Self {
        self.source_index = source_index;
        self
    }

    pub fn is_word(&self) -> bool {
        matches!(self.kind, ValueKind::Word)
    }

    /// Whether this is a function called `name` (ASCII case-insensitive).
    pub fn is_function(&self, name: &str) -> bool {
        matches!(self.kind, ValueKind::Function { .. }) && self.value.eq_ignore_ascii_case(name)
    }

    pub fn is_div(&self, div: &str) -> bool {
        matches!(self.kind, ValueKind::Div { .. }) && self.value == div
    }

    /// Arguments of a function node; empty for every other kind.
    pub fn nodes(&self) -> &[ValueNode] {
        match &self.kind {
            ValueKind::Function { nodes, .. } => nodes,
            _ => &[],
        }
    }

    pub(crate) fn nodes_mut(&mut self) -> Option<&mut Vec<ValueNode>> {
        match &mut self.kind {
            ValueKind::Function { nodes, .. } => Some(nodes),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        match &self.kind {
            ValueKind::Word | ValueKind::Space | ValueKind::UnicodeRange => out.push_str(&self.value),
            ValueKind::String { quote, unclosed } => {
                out.push(quote.as_char());
                out.push_str(&self.value);
                if !unclosed {
                    out.push(quote.as_char());
                }
            }
            ValueKind::Comment { unclosed } => {
                out.push_str("/*");
                out.push_str(&self.value);
                if !unclosed {
                    out.push_str("*/");
                }
            }
            ValueKind::Div { before, after } => {
                out.push_str(before);
                out.push_str(&self.value);
                out.push_str(after);
            }
            ValueKind::Function {
                before,
                after,
                nodes,
                unclosed,
            } => {
                out.push_str(&self.value);
                out.push('(');
                out.push_str(before);
                for node in nodes {
                    node.write_to(out);
                }
                out.push_str(after);
                if !unclosed {
                    out.push(')');
                }
            }
        }
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

/// Print a node list back to CSS.
pub fn stringify(nodes: &[ValueNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_to(&mut out);
    }
    out
}
