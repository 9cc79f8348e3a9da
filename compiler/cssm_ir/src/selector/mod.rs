//! Selector syntax tree.
//!
//! Nodes live in a [`SelectorTree`] arena and refer to each other through
//! [`NodeId`] indices. Containers (root, selector, pseudo) own an ordered
//! child list and every attached node knows its parent.

mod print;
mod tree;

pub use tree::{SelectorTree, WalkControl};

use crate::escape::{Escaped, QuoteMark};
use crate::position::SourceSpan;

/// Index of a node in a [`SelectorTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap a raw arena index. Only meaningful for the tree that issued it.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Position in the arena's node vector.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Whitespace printed around a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spaces {
    pub before: String,
    pub after: String,
}

impl Spaces {
    /// Spaces with the given leading and trailing text.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Spaces {
            before: before.into(),
            after: after.into(),
        }
    }

    /// No whitespace on either side.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Namespace prefix on a type, universal, or attribute selector.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `|name`: elements in no namespace.
    Empty,
    /// `prefix|name`, including `*|name`.
    Named(Escaped),
}

/// Attribute selector fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attribute {
    /// `ns|` prefix before the attribute name.
    pub namespace: Option<Namespace>,
    /// Attribute name.
    pub attribute: Escaped,
    /// `=`, `~=`, `|=`, `^=`, `$=`, or `*=`.
    pub operator: Option<Escaped>,
    /// Logical value; the printed form carries the quotes, if any.
    pub value: Option<Escaped>,
    pub quote_mark: Option<QuoteMark>,
    /// Trailing `i` flag.
    pub insensitive: bool,
    /// Flag text as written when it differs from the plain `i`.
    pub insensitive_raw: Option<String>,
    pub spaces: AttributeSpaces,
}

/// Whitespace around each attribute field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSpaces {
    pub attribute: Spaces,
    pub operator: Spaces,
    pub value: Spaces,
    pub insensitive: Spaces,
}

impl Attribute {
    /// `ns|name` as written.
    pub fn qualified_name(&self) -> String {
        let mut out = String::new();
        if let Some(ns) = &self.namespace {
            print::push_namespace(&mut out, ns);
        }
        out.push_str(self.attribute.printed());
        out
    }

    /// Set the value, quoting it with `quote` or escaping it as an
    /// identifier when `quote` is `None`.
    pub fn set_value(&mut self, value: &str, quote: Option<QuoteMark>) {
        self.value = Some(match quote {
            Some(q) => {
                let mark = q.as_char();
                let raw = format!("{mark}{}{mark}", crate::escape::escape_string(value, q));
                Escaped::with_raw(value, raw)
            }
            None => Escaped::identifier(value),
        });
        self.quote_mark = quote;
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The selector list. A trailing comma is kept for printing.
    Root {
        trailing_comma: bool,
    },
    /// One complex selector of a list.
    Selector,
    /// `.name`
    ClassName(Escaped),
    /// `#name`
    Id(Escaped),
    /// Type selector, also used for keyframe percentages.
    Tag {
        value: Escaped,
        namespace: Option<Namespace>,
    },
    /// `*`
    Universal {
        namespace: Option<Namespace>,
    },
    /// `&`
    Nesting,
    Combinator {
        value: String,
        /// Printed instead of `value` when the source held comments.
        raw: Option<String>,
    },
    Attribute(Box<Attribute>),
    /// `:name` or `::name`; argument selectors are its children.
    Pseudo(String),
    /// Text kept as written, such as a quoted string or a parenthesised
    /// group with no pseudo before it.
    String(String),
    /// `/* ... */`, delimiters included.
    Comment(String),
}

/// Discriminant of [`NodeKind`], used by the typed walkers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeType {
    Root,
    Selector,
    ClassName,
    Id,
    Tag,
    Universal,
    Nesting,
    Combinator,
    Attribute,
    Pseudo,
    String,
    Comment,
}

impl NodeKind {
    /// The variant without its payload.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root { .. } => NodeType::Root,
            NodeKind::Selector => NodeType::Selector,
            NodeKind::ClassName(_) => NodeType::ClassName,
            NodeKind::Id(_) => NodeType::Id,
            NodeKind::Tag { .. } => NodeType::Tag,
            NodeKind::Universal { .. } => NodeType::Universal,
            NodeKind::Nesting => NodeType::Nesting,
            NodeKind::Combinator { .. } => NodeType::Combinator,
            NodeKind::Attribute(_) => NodeType::Attribute,
            NodeKind::Pseudo(_) => NodeType::Pseudo,
            NodeKind::String(_) => NodeType::String,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    /// Root, selector, and pseudo nodes hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Root { .. } | NodeKind::Selector | NodeKind::Pseudo(_)
        )
    }

    /// A descendant combinator, written as whitespace.
    pub fn is_spacing_combinator(&self) -> bool {
        matches!(self, NodeKind::Combinator { value, .. } if value == " ")
    }

    /// A combinator printed as `value`.
    pub fn combinator(value: impl Into<String>) -> Self {
        NodeKind::Combinator {
            value: value.into(),
            raw: None,
        }
    }

    /// A type selector without a namespace.
    pub fn tag(value: Escaped) -> Self {
        NodeKind::Tag {
            value,
            namespace: None,
        }
    }

    /// Logical value for nodes that carry one.
    pub fn value(&self) -> Option<&str> {
        match self {
            NodeKind::ClassName(v) | NodeKind::Id(v) | NodeKind::Tag { value: v, .. } => {
                Some(v.value())
            }
            NodeKind::Universal { .. } => Some("*"),
            NodeKind::Nesting => Some("&"),
            NodeKind::Combinator { value, .. }
            | NodeKind::Pseudo(value)
            | NodeKind::String(value)
            | NodeKind::Comment(value) => Some(value),
            NodeKind::Attribute(attr) => Some(attr.attribute.value()),
            NodeKind::Root { .. } | NodeKind::Selector => None,
        }
    }
}

/// A node together with its layout data.
#[derive(Clone, Debug)]
pub struct Node {
    /// What the node is, with its values.
    pub kind: NodeKind,
    /// Whitespace printed around the node.
    pub spaces: Spaces,
    /// Line and column range of the node in the parsed selector.
    pub source: Option<SourceSpan>,
    /// Byte offset of the node's first token, or 0 for synthesized nodes.
    pub source_index: u32,
    /// The input ended before this attribute or pseudo's closing bracket;
    /// the bracket is not printed.
    pub unclosed: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// A detached node with no whitespace and no source position.
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            spaces: Spaces::default(),
            source: None,
            source_index: 0,
            unclosed: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the surrounding whitespace.
    #[must_use]
    pub fn with_spaces(mut self, spaces: Spaces) -> Self {
        self.spaces = spaces;
        self
    }

    /// Set the source span and the byte offset of the first token.
    #[must_use]
    pub fn with_source(mut self, source: SourceSpan, source_index: u32) -> Self {
        self.source = Some(source);
        self.source_index = source_index;
        self
    }

    /// The containing node; `None` when detached or for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in source order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests;
