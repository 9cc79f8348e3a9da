//! Local-by-default.
//!
//! The first pass over a sheet. Marks everything that should be scoped with
//! an explicit `:local(...)` so the scope pass only has to look for that
//! marker:
//!
//! - classes and ids in selectors, unless global by mode or marker,
//! - `@keyframes` names,
//! - animation names in `animation` and `animation-name`.
//!
//! In [`ScopeMode::Pure`] a rule must also hold at least one local class
//! or id, unless a `/* cssmodules-pure-ignore */` comment precedes it or
//! the sheet opens with `/* cssmodules-pure-no-check */`.

mod declaration;
mod selector;

use cssm_diagnostic::{Diagnostic, ErrorCode};
use rustc_hash::FxHashSet;

use crate::icss::collect_icss;
use crate::options::ScopeMode;
use crate::sheet::{AtRule, CssNode, Rule, Stylesheet};

use self::declaration::DeclarationLocalizer;
use self::selector::localize_selector;

const IGNORE_NEXT_MARKER: &str = "cssmodules-pure-ignore";
const IGNORE_FILE_MARKER: &str = "cssmodules-pure-no-check";

/// Run local-by-default over `sheet`.
#[tracing::instrument(level = "debug", skip_all, fields(mode = ?mode))]
pub fn local_by_default(sheet: &mut Stylesheet, mode: ScopeMode) -> Result<(), Diagnostic> {
    let aliases: FxHashSet<String> = collect_icss(&sheet.nodes)
        .aliases()
        .map(str::to_owned)
        .collect();
    let pass = LocalByDefault {
        mode,
        enforce_pure: mode == ScopeMode::Pure && !pure_check_disabled(sheet),
        aliases: &aliases,
    };
    pass.at_rules(&mut sheet.nodes)?;
    pass.rules(&mut sheet.nodes, Parent::Root)
}

/// The sheet opens with a comment run containing the file marker.
fn pure_check_disabled(sheet: &Stylesheet) -> bool {
    for node in &sheet.nodes {
        let CssNode::Comment(comment) = node else {
            return false;
        };
        if comment.text.trim().starts_with(IGNORE_FILE_MARKER) {
            return true;
        }
    }
    false
}

fn is_ignore_comment(node: &CssNode) -> bool {
    matches!(node, CssNode::Comment(c) if c.text.trim().starts_with(IGNORE_NEXT_MARKER))
}

/// `:global(x)` or `:local(x)` as a whole at-rule prelude.
pub(crate) fn scoped_param<'p>(params: &'p str, pseudo: &str) -> Option<&'p str> {
    let inner = params
        .trim()
        .strip_prefix(pseudo)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    (!inner.is_empty()).then_some(inner)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Parent {
    Root,
    /// A rule; `checked` when it went through the pure check.
    Rule { checked: bool },
    AtRule { keyframes: bool },
}

struct LocalByDefault<'a> {
    mode: ScopeMode,
    enforce_pure: bool,
    aliases: &'a FxHashSet<String>,
}

impl LocalByDefault<'_> {
    fn declarations(&self, nodes: &mut [CssNode], global: bool, deep: bool) {
        let localizer = DeclarationLocalizer {
            global,
            aliases: self.aliases,
        };
        for node in nodes {
            match node {
                CssNode::Decl(decl) => localizer.localize(decl),
                CssNode::Rule(rule) if deep => self.declarations(&mut rule.nodes, global, deep),
                _ => {}
            }
        }
    }

    /// `@keyframes` names, and declarations directly inside other
    /// at-rules.
    fn at_rules(&self, nodes: &mut Vec<CssNode>) -> Result<(), Diagnostic> {
        let mut i = 0;
        while i < nodes.len() {
            let ignored = i > 0 && is_ignore_comment(&nodes[i - 1]);
            let mut consumed_ignore = false;
            match &mut nodes[i] {
                CssNode::AtRule(at) if at.is_keyframes() => {
                    consumed_ignore = self.keyframes(at, ignored)?;
                }
                CssNode::AtRule(at) => {
                    if let Some(children) = &mut at.nodes {
                        self.declarations(children, self.mode == ScopeMode::Global, false);
                        self.at_rules(children)?;
                    }
                }
                CssNode::Rule(rule) => self.at_rules(&mut rule.nodes)?,
                _ => {}
            }
            if consumed_ignore {
                nodes.remove(i - 1);
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    /// Returns whether the ignore comment before the at-rule was used.
    fn keyframes(&self, at: &mut AtRule, ignored: bool) -> Result<bool, Diagnostic> {
        let mut global = self.mode == ScopeMode::Global;
        let mut consumed_ignore = false;

        if let Some(name) = scoped_param(&at.params, ":global") {
            if self.enforce_pure {
                if !ignored {
                    return Err(Diagnostic::new(
                        ErrorCode::E2004,
                        "@keyframes :global(...) is not allowed in pure mode",
                        at.offset,
                    ));
                }
                consumed_ignore = true;
            }
            at.params = name.to_owned();
            global = true;
        } else if scoped_param(&at.params, ":local").is_some() {
            global = false;
        } else if !at.params.is_empty() && !global && !self.aliases.contains(&at.params) {
            at.params = format!(":local({})", at.params);
        }

        if let Some(children) = &mut at.nodes {
            self.declarations(children, global, true);
        }
        Ok(consumed_ignore)
    }

    fn rules(&self, nodes: &mut Vec<CssNode>, parent: Parent) -> Result<(), Diagnostic> {
        let mut i = 0;
        while i < nodes.len() {
            let ignored = self.enforce_pure && i > 0 && is_ignore_comment(&nodes[i - 1]);
            let mut consumed_ignore = false;
            match &mut nodes[i] {
                CssNode::Rule(rule) => {
                    if parent != (Parent::AtRule { keyframes: true }) {
                        consumed_ignore = self.rule(rule, parent, ignored)?;
                    }
                    self.rules(
                        &mut rule.nodes,
                        Parent::Rule {
                            checked: self.mode == ScopeMode::Pure,
                        },
                    )?;
                }
                CssNode::AtRule(at) => {
                    let keyframes = at.is_keyframes();
                    if let Some(children) = &mut at.nodes {
                        self.rules(children, Parent::AtRule { keyframes })?;
                    }
                }
                _ => {}
            }
            if consumed_ignore {
                nodes.remove(i - 1);
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    /// Returns whether the ignore comment before the rule was used.
    fn rule(&self, rule: &mut Rule, parent: Parent, ignored: bool) -> Result<bool, Diagnostic> {
        let nesting_is_local = matches!(parent, Parent::Rule { checked: true });
        let localized = localize_selector(&rule.selector, self.mode, self.aliases, nesting_is_local)
            .map_err(|err| err.offset_by(rule.offset))?;

        if self.enforce_pure && localized.has_pure_globals && !ignored {
            return Err(Diagnostic::new(
                ErrorCode::E2004,
                format!(
                    "Selector \"{}\" is not pure (pure selectors must contain at least one local class or id)",
                    rule.selector
                ),
                rule.offset,
            ));
        }

        if rule.selector != localized.selector {
            tracing::trace!(from = %rule.selector, to = %localized.selector, "localized selector");
            rule.selector = localized.selector;
        }
        self.declarations(&mut rule.nodes, localized.global, false);
        Ok(ignored)
    }
}

#[cfg(test)]
mod tests;
