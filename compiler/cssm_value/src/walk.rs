//! Visitors over value nodes.

use crate::node::ValueNode;

/// Pre-order walk. Returning `false` from `f` skips a function's
/// arguments.
pub fn walk<F>(nodes: &[ValueNode], f: &mut F)
where
    F: FnMut(&ValueNode) -> bool,
{
    for node in nodes {
        if f(node) {
            walk(node.nodes(), f);
        }
    }
}

/// Pre-order walk with mutable access.
pub fn walk_mut<F>(nodes: &mut [ValueNode], f: &mut F)
where
    F: FnMut(&mut ValueNode) -> bool,
{
    for node in nodes {
        if f(node) {
            if let Some(children) = node.nodes_mut() {
                walk_mut(children, f);
            }
        }
    }
}

/// Post-order walk: arguments are visited before their function.
pub fn walk_post<F>(nodes: &[ValueNode], f: &mut F)
where
    F: FnMut(&ValueNode),
{
    for node in nodes {
        walk_post(node.nodes(), f);
        f(node);
    }
}
