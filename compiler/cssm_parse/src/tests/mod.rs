//! Parser tests.
//!
//! - `roundtrip`: printing a parsed selector reproduces its source
//! - `structure`: node kinds, values, spaces, and source positions
//! - `attribute`: attribute selector fields
//! - `errors`: diagnostics for malformed selectors

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod roundtrip;
mod structure;

use cssm_ir::{NodeId, NodeType, SelectorTree};

/// Node types of the children of the `n`th selector.
pub(crate) fn types(tree: &SelectorTree, n: usize) -> Vec<NodeType> {
    children(tree, n)
        .iter()
        .map(|&c| tree.kind(c).node_type())
        .collect()
}

pub(crate) fn children(tree: &SelectorTree, n: usize) -> Vec<NodeId> {
    let selector = tree.children(tree.root())[n];
    tree.children(selector).to_vec()
}
