//! Arena storage and structural operations for selector nodes.

use smallvec::SmallVec;

use super::{Node, NodeId, NodeKind, NodeType};

/// Result of a walk callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WalkControl {
    Continue,
    /// Do not descend into this node's children.
    SkipChildren,
    /// End the walk.
    Stop,
}

type Snapshot = SmallVec<[NodeId; 8]>;

/// Arena of selector nodes with a single root.
///
/// Removed nodes stay allocated but detached; ids are never reused.
#[derive(Clone, Debug)]
pub struct SelectorTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for SelectorTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorTree {
    /// An empty tree holding only the root.
    pub fn new() -> Self {
        SelectorTree {
            nodes: vec![Node::new(NodeKind::Root {
                trailing_comma: false,
            })],
            root: NodeId::new(0),
        }
    }

    /// The root node; its children are the comma-separated selectors.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a detached node.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    /// Allocate a detached node of `kind` with no layout data.
    pub fn alloc_kind(&mut self, kind: NodeKind) -> NodeId {
        self.alloc(Node::new(kind))
    }

    /// The node at `id`, attached or not.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutable access to the node at `id`.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Shorthand for `self.get(id).kind`.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Mutable access to the kind of `id`, for rewriting a node in place.
    #[inline]
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    /// The container holding `id`, or `None` for the root and detached nodes.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Children of `id` in source order. Empty for leaves.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// First child of `id`.
    pub fn first(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Last child of `id`.
    pub fn last(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Child of `id` at `index`.
    pub fn at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Position of `child` in `parent`'s child list.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// The node after `id` in its parent, if any.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(parent, id)?;
        self.at(parent, index + 1)
    }

    /// The node before `id` in its parent, if any.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(parent, id)?;
        index.checked_sub(1).and_then(|i| self.at(parent, i))
    }

    /// Whether `id` is a root, selector, or pseudo.
    pub fn is_container(&self, id: NodeId) -> bool {
        self.kind(id).is_container()
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(self.is_container(parent), "{parent:?} cannot hold children");
        self.detach(child);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Attach `child` as the last child of `parent`, moving it out of any
    /// previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_at(parent, len, child);
    }

    /// Attach `child` as the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        self.insert_at(parent, 0, child);
    }

    /// Insert `node` immediately before `reference` in its parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(node);
        if let Some(index) = self.index_of(parent, reference) {
            self.insert_at(parent, index, node);
        }
    }

    /// Insert `node` immediately after `reference` in its parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(node);
        if let Some(index) = self.index_of(parent, reference) {
            self.insert_at(parent, index + 1, node);
        }
    }

    /// Detach `id` from its parent. The node keeps its own children.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Detach every child of `parent`.
    pub fn remove_all(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent.index()].children);
        for child in children {
            self.nodes[child.index()].parent = None;
        }
    }

    /// Put `replacements` where `id` was, then detach `id`.
    pub fn replace_with(&mut self, id: NodeId, replacements: &[NodeId]) {
        if self.parent(id).is_none() {
            return;
        }
        for &node in replacements {
            if node != id {
                self.insert_before(id, node);
            }
        }
        if !replacements.contains(&id) {
            self.detach(id);
        }
    }

    /// Replace the whole child list of `parent`.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.remove_all(parent);
        for child in children {
            self.append(parent, child);
        }
    }

    /// Visit each child of `parent`.
    ///
    /// The child list is captured before the first call, so `f` may insert
    /// or remove siblings. Children removed before their turn are skipped.
    pub fn each<F>(&mut self, parent: NodeId, mut f: F) -> WalkControl
    where
        F: FnMut(&mut Self, NodeId) -> WalkControl,
    {
        let snapshot: Snapshot = self.children(parent).iter().copied().collect();
        for child in snapshot {
            if self.parent(child) != Some(parent) {
                continue;
            }
            if f(self, child) == WalkControl::Stop {
                return WalkControl::Stop;
            }
        }
        WalkControl::Continue
    }

    /// Pre-order walk over the descendants of `from`.
    pub fn walk<F>(&mut self, from: NodeId, mut f: F) -> WalkControl
    where
        F: FnMut(&mut Self, NodeId) -> WalkControl,
    {
        self.walk_inner(from, &mut f)
    }

    fn walk_inner<F>(&mut self, parent: NodeId, f: &mut F) -> WalkControl
    where
        F: FnMut(&mut Self, NodeId) -> WalkControl,
    {
        let snapshot: Snapshot = self.children(parent).iter().copied().collect();
        for child in snapshot {
            if self.parent(child) != Some(parent) {
                continue;
            }
            match f(self, child) {
                WalkControl::Stop => return WalkControl::Stop,
                WalkControl::SkipChildren => {}
                WalkControl::Continue => {
                    if self.walk_inner(child, f) == WalkControl::Stop {
                        return WalkControl::Stop;
                    }
                }
            }
        }
        WalkControl::Continue
    }

    /// Walk only nodes whose kind satisfies `pred`.
    pub fn walk_matching<P, F>(&mut self, from: NodeId, pred: P, mut f: F) -> WalkControl
    where
        P: Fn(&NodeKind) -> bool,
        F: FnMut(&mut Self, NodeId) -> WalkControl,
    {
        self.walk(from, |tree, id| {
            if pred(tree.kind(id)) {
                f(tree, id)
            } else {
                WalkControl::Continue
            }
        })
    }

    /// Walk only nodes of one type.
    pub fn walk_type<F>(&mut self, from: NodeId, ty: NodeType, f: F) -> WalkControl
    where
        F: FnMut(&mut Self, NodeId) -> WalkControl,
    {
        self.walk_matching(from, |kind| kind.node_type() == ty, f)
    }

    /// Pre-order list of the descendants of `from`.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Snapshot = self.children(from).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Whether any descendant of `from` satisfies `pred`.
    pub fn some<P>(&self, from: NodeId, pred: P) -> bool
    where
        P: Fn(&NodeKind) -> bool,
    {
        self.descendants(from)
            .into_iter()
            .any(|id| pred(self.kind(id)))
    }

    /// Copy the subtree under `id` into fresh, detached nodes.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut node = self.nodes[id.index()].clone();
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        let copy = self.alloc(node);
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Print the subtree under `id`.
    pub fn print(&self, id: NodeId) -> String {
        let mut out = String::new();
        super::print::push_node(self, id, &mut out);
        out
    }

    /// Set whether the root ends with a dangling comma.
    pub fn set_trailing_comma(&mut self, value: bool) {
        let root = self.root;
        if let NodeKind::Root { trailing_comma } = self.kind_mut(root) {
            *trailing_comma = value;
        }
    }
}

impl std::fmt::Display for SelectorTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.print(self.root))
    }
}
