//! Declaration half of local-by-default: animation names.

use cssm_value::{ValueKind, ValueNode};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::sheet::{ends_with_ignore_case, Decl};

/// Keywords of the `animation` shorthand, with how many times each may
/// appear before a further occurrence is read as a name.
fn keyword_limit(word: &str) -> Option<u32> {
    match word {
        // direction, fill mode, iteration count, play state
        "normal" | "reverse" | "alternate" | "alternate-reverse" | "forwards" | "backwards"
        | "both" | "infinite" | "paused" | "running" => Some(1),
        // timing functions
        "ease" | "ease-in" | "ease-out" | "ease-in-out" | "linear" | "step-end"
        | "step-start" => Some(1),
        // never a name
        "none" | "initial" | "inherit" | "unset" | "revert" | "revert-layer" => Some(u32::MAX),
        _ => None,
    }
}

/// Values of `animation-name` that are never names.
const SPECIAL_KEYWORDS: &[&str] = &["none", "inherit", "initial", "revert", "revert-layer", "unset"];

/// Whether `word` could be a `<custom-ident>`.
fn is_valid_ident(word: &str) -> bool {
    let mut chars = word.chars().peekable();
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    let valid_escape = |c: Option<char>| c.is_some_and(|c| !matches!(c, '\r' | '\n' | '\x0c'));
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => {}
        Some('\\') => {
            if !valid_escape(chars.next()) {
                return false;
            }
        }
        Some('-') => {
            if chars.peek().is_some_and(char::is_ascii_digit) {
                return false;
            }
        }
        _ => return false,
    }
    while let Some(c) = chars.next() {
        let ok = match c {
            '\\' => valid_escape(chars.next()),
            c => c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii(),
        };
        if !ok {
            return false;
        }
    }
    true
}

pub(crate) struct DeclarationLocalizer<'a> {
    pub(crate) global: bool,
    pub(crate) aliases: &'a FxHashSet<String>,
}

impl DeclarationLocalizer<'_> {
    /// Mark animation names in `decl` as `:local(name)`.
    pub(crate) fn localize(&self, decl: &mut Decl) {
        let localized = if ends_with_ignore_case(&decl.prop, "animation") {
            self.shorthand(&decl.value)
        } else if ends_with_ignore_case(&decl.prop, "animation-name") {
            self.names(&decl.value)
        } else {
            None
        };
        if let Some(value) = localized {
            tracing::trace!(prop = %decl.prop, %value, "localized animation");
            decl.value = value;
        }
    }

    fn wrap(&self, node: &mut ValueNode) -> bool {
        if self.aliases.contains(&node.value) {
            return false;
        }
        node.value = format!(":local({})", node.value);
        true
    }

    /// `animation: 1s ease-in name, ...`
    fn shorthand(&self, value: &str) -> Option<String> {
        let mut nodes = cssm_value::parse(value);
        let mut seen: FxHashMap<String, u32> = FxHashMap::default();
        let mut changed = false;

        cssm_value::walk_mut(&mut nodes, &mut |node: &mut ValueNode| {
            match &node.kind {
                ValueKind::Div { .. } => {
                    // Each comma-separated animation counts keywords anew.
                    seen.clear();
                    return true;
                }
                ValueKind::Function { nodes: args, .. } => {
                    let local = node.is_function("local");
                    if (local || node.is_function("global")) && args.len() == 1 {
                        let inner = args[0].value.clone();
                        *node = ValueNode::word(inner).at(node.source_index);
                        changed = true;
                        if local && !self.global {
                            self.wrap(node);
                        }
                    }
                    return false;
                }
                ValueKind::Word => {}
                _ => return true,
            }

            let lower = node.value.to_ascii_lowercase();
            let is_name = is_valid_ident(&lower)
                && match keyword_limit(&lower) {
                    Some(limit) => {
                        let count = seen
                            .entry(lower)
                            .and_modify(|n| *n = n.saturating_add(1))
                            .or_insert(0);
                        *count >= limit
                    }
                    None => true,
                };
            if is_name && !self.global && self.wrap(node) {
                changed = true;
            }
            true
        });

        changed.then(|| cssm_value::stringify(&nodes))
    }

    /// `animation-name: a, b`
    fn names(&self, value: &str) -> Option<String> {
        if self.global {
            return None;
        }
        let mut nodes = cssm_value::parse(value);
        let mut changed = false;
        cssm_value::walk_mut(&mut nodes, &mut |node: &mut ValueNode| {
            if node.is_function("var") || node.is_function("env") {
                return false;
            }
            if node.is_word() {
                let lower = node.value.to_ascii_lowercase();
                if !SPECIAL_KEYWORDS.contains(&lower.as_str()) && self.wrap(node) {
                    changed = true;
                }
            }
            true
        });
        changed.then(|| cssm_value::stringify(&nodes))
    }
}
