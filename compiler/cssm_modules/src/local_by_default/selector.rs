//! Selector half of local-by-default.
//!
//! Walks a parsed selector with a context threaded through siblings and
//! wraps every class and id that ends up local in `:local(...)`. Explicit
//! `:local`/`:global` markers are consumed on the way: the parenthesised
//! form is replaced by its contents, the bare form switches the mode for
//! the rest of its selector.

use cssm_diagnostic::{Diagnostic, ErrorCode};
use cssm_ir::{Node, NodeId, NodeKind, NodeType, SelectorTree, Spaces};
use rustc_hash::FxHashSet;

use crate::options::ScopeMode;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Scope {
    Local,
    Global,
}

impl Scope {
    fn from_pseudo(value: &str) -> Option<Scope> {
        match value {
            ":local" => Some(Scope::Local),
            ":global" => Some(Scope::Global),
            _ => None,
        }
    }

    fn pseudo(self) -> &'static str {
        match self {
            Scope::Local => ":local",
            Scope::Global => ":global",
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct Context {
    global: bool,
    /// Set inside `:local(...)` or `:global(...)`.
    inside: Option<Scope>,
    last_was_spacing: bool,
    has_locals: bool,
    /// The mode was set by an explicit marker.
    explicit: bool,
    /// A bare marker after whitespace wants whitespace after it too.
    ignore_next_spacing: Option<Scope>,
    /// A bare marker glued to the previous node forbids whitespace after it.
    enforce_no_spacing: Option<Scope>,
}

/// A rewritten selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LocalizedSelector {
    pub(crate) selector: String,
    /// Mode the selectors ended in; decides how the rule's declarations are
    /// treated.
    pub(crate) global: bool,
    /// Some selector holds no local class or id.
    pub(crate) has_pure_globals: bool,
}

/// Rewrite `selector` so every class and id that is local under `mode` is
/// wrapped in `:local(...)`.
///
/// `aliases` are names imported through `:import`; they stay as written
/// unless an explicit `:local` asks for them. `nesting_is_local` makes `&`
/// count as a local, for rules nested in a rule that passed the pure check.
pub(crate) fn localize_selector(
    selector: &str,
    mode: ScopeMode,
    aliases: &FxHashSet<String>,
    nesting_is_local: bool,
) -> Result<LocalizedSelector, Diagnostic> {
    let tree = cssm_parse::parse(selector)?;
    let mut localizer = Localizer {
        tree,
        aliases,
        nesting_is_local,
    };
    let root = localizer.tree.root();
    let mut global = None;
    let mut has_pure_globals = false;

    for sel in localizer.tree.children(root).to_vec() {
        let mut ctx = Context {
            global: mode == ScopeMode::Global,
            last_was_spacing: true,
            ..Context::default()
        };
        localizer.transform(sel, &mut ctx)?;
        match global {
            None => global = Some(ctx.global),
            Some(g) if g != ctx.global => {
                return Err(Diagnostic::new(
                    ErrorCode::E2001,
                    format!(
                        "Inconsistent rule global/local result in rule \"{selector}\" (multiple selectors must result in the same mode for the rule)"
                    ),
                    localizer.tree.get(sel).source_index,
                ));
            }
            Some(_) => {}
        }
        if !ctx.has_locals {
            has_pure_globals = true;
        }
    }

    Ok(LocalizedSelector {
        selector: localizer.tree.to_string(),
        global: global.unwrap_or(mode == ScopeMode::Global),
        has_pure_globals,
    })
}

struct Localizer<'a> {
    tree: SelectorTree,
    aliases: &'a FxHashSet<String>,
    nesting_is_local: bool,
}

impl Localizer<'_> {
    /// Transform `id` and return what should stand in its place.
    fn transform(&mut self, id: NodeId, ctx: &mut Context) -> Result<Vec<NodeId>, Diagnostic> {
        let offset = self.tree.get(id).source_index;
        let spacing = self.tree.kind(id).is_spacing_combinator();
        if let Some(scope) = ctx.ignore_next_spacing {
            if !spacing {
                return Err(missing_whitespace("after", scope, offset));
            }
        }
        if let Some(scope) = ctx.enforce_no_spacing {
            if spacing {
                return Err(missing_whitespace("before", scope, offset));
            }
        }

        let mut replacement = vec![id];
        match self.tree.kind(id).node_type() {
            NodeType::Selector => {
                let mut children = Vec::new();
                for child in self.tree.children(id).to_vec() {
                    children.extend(self.transform(child, ctx)?);
                }
                self.set_normalized(id, children);
            }
            NodeType::Combinator if spacing => {
                if ctx.ignore_next_spacing.is_some() {
                    ctx.ignore_next_spacing = None;
                    ctx.last_was_spacing = false;
                    ctx.enforce_no_spacing = None;
                    return Ok(Vec::new());
                }
                ctx.last_was_spacing = true;
                return Ok(replacement);
            }
            NodeType::Pseudo => {
                let value = self.tree.kind(id).value().unwrap_or_default().to_owned();
                let scope = Scope::from_pseudo(&value);
                let nested = !self.tree.children(id).is_empty();

                if value == ":import" || value == ":export" {
                    ctx.has_locals = true;
                } else if let (true, Some(scope)) = (nested, scope) {
                    replacement = self.scoped_arguments(id, scope, ctx)?;
                } else if nested {
                    self.pseudo_arguments(id, ctx)?;
                } else if let Some(scope) = scope {
                    if let Some(inside) = ctx.inside {
                        return Err(nested_conflict(scope, inside, offset));
                    }
                    let add_back_spacing = !self.tree.get(id).spaces.before.is_empty();
                    ctx.ignore_next_spacing = ctx.last_was_spacing.then_some(scope);
                    ctx.enforce_no_spacing = (!ctx.last_was_spacing).then_some(scope);
                    ctx.global = scope == Scope::Global;
                    ctx.explicit = true;
                    // The marker's leading whitespace goes with it; a
                    // descendant combinator stands in for it.
                    if add_back_spacing {
                        return Ok(vec![self.tree.alloc_kind(NodeKind::combinator(" "))]);
                    }
                    return Ok(Vec::new());
                }
            }
            NodeType::ClassName | NodeType::Id => {
                let name = self.tree.kind(id).value().unwrap_or_default();
                if name.is_empty() {
                    return Err(Diagnostic::unexpected(
                        "Invalid class or id selector syntax",
                        offset,
                    ));
                }
                if !ctx.global {
                    let imported = self.aliases.contains(name);
                    if !imported || ctx.explicit {
                        replacement = vec![self.wrap_local(id)];
                        ctx.has_locals = true;
                    }
                }
            }
            NodeType::Nesting => ctx.has_locals = self.nesting_is_local,
            _ => {}
        }

        ctx.last_was_spacing = false;
        ctx.ignore_next_spacing = None;
        ctx.enforce_no_spacing = None;
        Ok(replacement)
    }

    /// `:local(...)` or `:global(...)`: transform the arguments in a fresh
    /// context and splice their nodes in place of the pseudo.
    fn scoped_arguments(
        &mut self,
        id: NodeId,
        scope: Scope,
        ctx: &mut Context,
    ) -> Result<Vec<NodeId>, Diagnostic> {
        let offset = self.tree.get(id).source_index;
        let arguments = self.tree.children(id).to_vec();
        if arguments.iter().all(|&sel| self.is_empty_selector(sel)) {
            return Err(Diagnostic::new(
                ErrorCode::E2003,
                format!("{}() can't be empty", scope.pseudo()),
                offset,
            ));
        }
        if let Some(inside) = ctx.inside {
            return Err(nested_conflict(scope, inside, offset));
        }

        let mut inner = Context {
            global: scope == Scope::Global,
            inside: Some(scope),
            explicit: true,
            ..Context::default()
        };
        let mut nodes = Vec::new();
        for sel in arguments {
            for transformed in self.transform(sel, &mut inner)? {
                nodes.extend(self.tree.children(transformed).iter().copied());
            }
        }
        if inner.has_locals {
            ctx.has_locals = true;
        }

        let Spaces { before, after } = self.tree.get(id).spaces.clone();
        if let Some(&first) = nodes.first() {
            self.tree.get_mut(first).spaces.before = before;
        }
        if let Some(&last) = nodes.last() {
            self.tree.get_mut(last).spaces.after = after;
        }
        Ok(nodes)
    }

    /// Any other pseudo with arguments: each argument starts fresh but
    /// inherits the mode, and the mode it ends in carries over.
    fn pseudo_arguments(&mut self, id: NodeId, ctx: &mut Context) -> Result<(), Diagnostic> {
        let mut shared = Context {
            global: ctx.global,
            inside: ctx.inside,
            last_was_spacing: true,
            has_locals: false,
            explicit: ctx.explicit,
            ..Context::default()
        };
        let mut children = Vec::new();
        for sel in self.tree.children(id).to_vec() {
            let mut each = Context {
                enforce_no_spacing: None,
                ..shared
            };
            children.extend(self.transform(sel, &mut each)?);
            shared.global = each.global;
            shared.has_locals = each.has_locals;
        }
        self.set_normalized(id, children);
        if shared.has_locals {
            ctx.has_locals = true;
        }
        Ok(())
    }

    fn is_empty_selector(&self, sel: NodeId) -> bool {
        self.tree
            .children(sel)
            .iter()
            .all(|&c| matches!(self.tree.kind(c), NodeKind::String(s) if s.is_empty()))
    }

    /// Move `id` into a new `:local(...)` that takes over its whitespace.
    fn wrap_local(&mut self, id: NodeId) -> NodeId {
        let node = self.tree.get_mut(id);
        let spaces = std::mem::take(&mut node.spaces);
        let source_index = node.source_index;
        let mut pseudo = Node::new(NodeKind::Pseudo(":local".to_owned())).with_spaces(spaces);
        pseudo.source_index = source_index;

        let pseudo = self.tree.alloc(pseudo);
        let selector = self.tree.alloc_kind(NodeKind::Selector);
        self.tree.append(selector, id);
        self.tree.append(pseudo, selector);
        pseudo
    }

    /// Replace the children of `parent`, dropping a trailing descendant
    /// combinator.
    fn set_normalized(&mut self, parent: NodeId, mut children: Vec<NodeId>) {
        if children
            .last()
            .is_some_and(|&last| self.tree.kind(last).is_spacing_combinator())
        {
            children.pop();
        }
        self.tree.set_children(parent, children);
    }
}

fn missing_whitespace(side: &str, scope: Scope, offset: u32) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::E1004,
        format!("Missing whitespace {side} {}", scope.pseudo()),
        offset,
    )
}

fn nested_conflict(scope: Scope, inside: Scope, offset: u32) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::E2002,
        format!(
            "A {} is not allowed inside of a {}(...)",
            scope.pseudo(),
            inside.pseudo()
        ),
        offset,
    )
}
