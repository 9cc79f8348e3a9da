//! Import graph and import ordering.
//!
//! Each `composes ... from "path"` or `:import("path")` adds `path` to the
//! graph with an edge to every import its rule declared earlier, so sibling
//! imports keep their declaration order. A depth-first walk in post-order
//! then yields an order where every import follows the imports it must come
//! after.

use std::cmp::Ordering;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Two imports that can be ordered both ways.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Nondeterministic import's order between `{first}` and `{second}`")]
pub struct OrderConflict {
    /// The import reached again while still being ordered.
    pub first: String,
    /// The import whose dependencies led back to `first`.
    pub second: String,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Import dependency graph.
#[derive(Clone, Debug, Default)]
pub struct ImportGraph {
    /// Keys in insertion order.
    nodes: Vec<String>,
    /// Key to the keys that must be ordered before it.
    edges: FxHashMap<String, Vec<String>>,
    /// Imports already declared per parent, in declaration order.
    siblings: FxHashMap<String, Vec<String>>,
    /// `(parent, import)` pairs already added.
    visited: FxHashSet<(String, String)>,
}

impl ImportGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, key: &str) -> &mut Vec<String> {
        if !self.edges.contains_key(key) {
            self.nodes.push(key.to_owned());
        }
        self.edges.entry(key.to_owned()).or_default()
    }

    /// Record that `parent` imports `import`. Repeats are ignored.
    pub fn add_import(&mut self, import: &str, parent: &str) {
        if !self
            .visited
            .insert((parent.to_owned(), import.to_owned()))
        {
            return;
        }
        let earlier = self.siblings.entry(parent.to_owned()).or_default().clone();
        self.ensure(import).extend(earlier);
        if let Some(siblings) = self.siblings.get_mut(parent) {
            siblings.push(import.to_owned());
        }
    }

    /// Add `key` with explicit dependencies.
    pub fn add_node(&mut self, key: &str, dependencies: &[&str]) {
        for dep in dependencies {
            self.ensure(dep);
        }
        self.ensure(key)
            .extend(dependencies.iter().map(|d| (*d).to_owned()));
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `key` was added as an import, a parent, or a node.
    pub fn contains(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    /// Keys that must precede `key`.
    pub fn dependencies(&self, key: &str) -> &[String] {
        self.edges.get(key).map_or(&[], Vec::as_slice)
    }

    /// Order every key after its dependencies.
    ///
    /// Reaching a key that is still being visited means two imports were
    /// declared in opposite orders. In strict mode that is an error naming
    /// both; otherwise the offending edge is skipped.
    #[tracing::instrument(level = "debug", skip(self), fields(nodes = self.nodes.len()))]
    pub fn resolve_order(&self, strict: bool) -> Result<Vec<String>, OrderConflict> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut marks = FxHashMap::default();
        for node in &self.nodes {
            self.visit(node, strict, &mut marks, &mut result)?;
        }
        Ok(result)
    }

    fn visit<'g>(
        &'g self,
        node: &'g str,
        strict: bool,
        marks: &mut FxHashMap<&'g str, Mark>,
        result: &mut Vec<String>,
    ) -> Result<(), OrderConflict> {
        if marks.contains_key(node) {
            return Ok(());
        }
        marks.insert(node, Mark::InProgress);

        for dep in self.dependencies(node) {
            if marks.get(dep.as_str()) == Some(&Mark::InProgress) {
                if strict {
                    return Err(OrderConflict {
                        first: node.to_owned(),
                        second: dep.clone(),
                    });
                }
                tracing::debug!(from = node, to = %dep, "skipping cyclic import edge");
                continue;
            }
            self.visit(dep, strict, marks, result)?;
        }

        marks.insert(node, Mark::Done);
        result.push(node.to_owned());
        Ok(())
    }
}

/// Where a loaded stylesheet sits in the import tree: the number of the
/// entry it was reached from, then the declaration index of each import on
/// the way down.
///
/// The derived order puts a key before every key it is a prefix of, so a
/// parent sorts before its children and siblings follow declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceKey(SmallVec<[u32; 4]>);

impl TraceKey {
    /// Key of the `entry`-th entry point.
    pub fn root(entry: u32) -> Self {
        let mut segments = SmallVec::new();
        segments.push(entry);
        TraceKey(segments)
    }

    /// Key of the `index`-th import of this sheet.
    #[must_use]
    pub fn child(&self, index: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        TraceKey(segments)
    }

    /// Entry number followed by import indices.
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Whether `other` is this key or lies below it in the import tree.
    pub fn is_prefix_of(&self, other: &TraceKey) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Order for concatenating output: like [`Ord`], except that a key sorts
    /// after the keys it is a prefix of, so imported sheets come before the
    /// sheets importing them.
    pub fn dependency_order(&self, other: &TraceKey) -> Ordering {
        let common = self.0.len().min(other.0.len());
        match self.0[..common].cmp(&other.0[..common]) {
            Ordering::Equal => other.0.len().cmp(&self.0.len()),
            ord => ord,
        }
    }
}

impl fmt::Display for TraceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
