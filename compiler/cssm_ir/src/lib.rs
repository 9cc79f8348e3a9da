//! cssm IR - shared data structures
//!
//! - Source positions ([`Position`], [`SourceSpan`], [`LineIndex`])
//! - Escape rules for identifiers and strings ([`Escaped`])
//! - The selector node arena ([`SelectorTree`]) with its structural
//!   operations, walkers, and printer
//!
//! # Design
//!
//! - **Arena, not pointers**: nodes are addressed by [`NodeId`] and keep a
//!   parent index, so removal and re-parenting never alias.
//! - **Two forms per identifier**: the logical value for comparisons and
//!   the raw source text for printing, see [`Escaped`].
//! - **Lossless printing**: every byte of parsed input is held somewhere
//!   in the tree, so printing a parsed selector reproduces its source.

mod escape;
mod position;
pub mod selector;

pub use escape::{
    escape_ident, escape_string, unescape, unescape_string, EscapeError, Escaped, QuoteMark,
};
pub use position::{LineIndex, Position, SourceSpan};
pub use selector::{
    Attribute, AttributeSpaces, Namespace, Node, NodeId, NodeKind, NodeType, SelectorTree,
    Spaces, WalkControl,
};
