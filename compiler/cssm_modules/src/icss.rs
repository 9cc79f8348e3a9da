//! Interoperable CSS: `:import` and `:export` blocks.
//!
//! ```css
//! :import("./other.css") { i__imported_bar_0: bar; }
//! :export { foo: _app__foo i__imported_bar_0; }
//! ```
//!
//! Only top-level rules count. Symbols are replaced wherever a word of
//! `[$]?[\w-]+` matches an alias: selectors, declaration values, and
//! `@media`/`@supports` params.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::export::ExportTable;
use crate::sheet::{CssNode, Decl, Rule, Stylesheet};

/// One `:import(...)` block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IcssImport {
    pub path: String,
    /// `(alias, imported name)` in declaration order.
    pub aliases: Vec<(String, String)>,
}

/// Everything a sheet imports and exports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Icss {
    /// One entry per path, in first-seen order.
    pub imports: Vec<IcssImport>,
    pub exports: ExportTable,
}

impl Icss {
    /// Every alias any import block declares.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .flat_map(|import| import.aliases.iter().map(|(alias, _)| alias.as_str()))
    }
}

/// Path of an `:import(...)` selector, quoted or not.
pub fn import_path(selector: &str) -> Option<&str> {
    let inner = selector.strip_prefix(":import(")?.strip_suffix(')')?;
    let path = match inner.as_bytes().first()? {
        q @ (b'"' | b'\'') => {
            let body = inner.strip_prefix(char::from(*q))?.strip_suffix(char::from(*q))?;
            if body.contains(['"', '\'']) {
                return None;
            }
            body
        }
        _ if inner.contains(['"', '\'']) => return None,
        _ => inner,
    };
    Some(path)
}

/// Path of an `:import("...")` selector with a quoted, non-empty path.
pub(crate) fn quoted_import_path(selector: &str) -> Option<&str> {
    let inner = selector.strip_prefix(":import(")?.strip_suffix(')')?;
    let body = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))?;
    (!body.is_empty() && !body.contains(['"', '\''])).then_some(body)
}

pub fn is_export(selector: &str) -> bool {
    selector == ":export"
}

/// Read the ICSS blocks of `nodes` without changing them.
pub fn collect_icss(nodes: &[CssNode]) -> Icss {
    let mut icss = Icss::default();
    for rule in nodes.iter().filter_map(CssNode::as_rule) {
        if let Some(path) = import_path(&rule.selector) {
            let slot = match icss.imports.iter().position(|i| i.path == path) {
                Some(i) => i,
                None => {
                    icss.imports.push(IcssImport {
                        path: path.to_owned(),
                        aliases: Vec::new(),
                    });
                    icss.imports.len() - 1
                }
            };
            let aliases = &mut icss.imports[slot].aliases;
            for decl in rule.decls() {
                match aliases.iter_mut().find(|(alias, _)| *alias == decl.prop) {
                    Some(existing) => existing.1.clone_from(&decl.value),
                    None => aliases.push((decl.prop.clone(), decl.value.clone())),
                }
            }
        } else if is_export(&rule.selector) {
            for decl in rule.decls() {
                icss.exports.insert(decl.prop.as_str(), decl.value.as_str());
            }
        }
    }
    icss
}

/// Read the ICSS blocks of `sheet`, removing them when `remove` is set.
pub fn extract_icss(sheet: &mut Stylesheet, remove: bool) -> Icss {
    let icss = collect_icss(&sheet.nodes);
    if remove {
        sheet.nodes.retain(|node| {
            node.as_rule()
                .map_or(true, |r| import_path(&r.selector).is_none() && !is_export(&r.selector))
        });
    }
    icss
}

/// Build ICSS blocks: one `:import` rule per import, then `:export`.
pub fn create_icss_rules(imports: &[IcssImport], exports: &ExportTable) -> Vec<CssNode> {
    let mut rules = Vec::new();
    for import in imports {
        let mut rule = Rule::synthetic(format!(":import(\"{}\")", import.path));
        rule.nodes = import
            .aliases
            .iter()
            .map(|(alias, name)| CssNode::Decl(Decl::new(alias.as_str(), name.as_str())))
            .collect();
        rules.push(CssNode::Rule(rule));
    }
    if !exports.is_empty() {
        let mut rule = Rule::synthetic(":export");
        rule.nodes = exports
            .iter()
            .map(|(name, value)| CssNode::Decl(Decl::new(name, value)))
            .collect();
        rules.push(CssNode::Rule(rule));
    }
    rules
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Replace every `[$]?[\w-]+` word of `value` found in `replacements`.
///
/// Replacement text is not scanned again.
pub fn replace_value_symbols<'a>(
    value: &'a str,
    replacements: &FxHashMap<String, String>,
) -> Cow<'a, str> {
    if replacements.is_empty() {
        return Cow::Borrowed(value);
    }
    let bytes = value.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        let mut end = if bytes[pos] == b'$' { pos + 1 } else { pos };
        let word_start = end;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        if end == word_start {
            pos += 1;
            continue;
        }
        if let Some(replacement) = replacements.get(&value[start..end]) {
            out.push_str(&value[copied..start]);
            out.push_str(replacement);
            copied = end;
        }
        pos = end;
    }
    if copied == 0 {
        return Cow::Borrowed(value);
    }
    out.push_str(&value[copied..]);
    Cow::Owned(out)
}

fn replace_in(text: &mut String, replacements: &FxHashMap<String, String>) {
    if let Cow::Owned(replaced) = replace_value_symbols(text, replacements) {
        *text = replaced;
    }
}

/// Replace symbols throughout `nodes`.
pub fn replace_symbols(nodes: &mut [CssNode], replacements: &FxHashMap<String, String>) {
    if replacements.is_empty() {
        return;
    }
    for node in nodes {
        match node {
            CssNode::Decl(decl) => replace_in(&mut decl.value, replacements),
            CssNode::Rule(rule) => {
                replace_in(&mut rule.selector, replacements);
                replace_symbols(&mut rule.nodes, replacements);
            }
            CssNode::AtRule(at) => {
                if at.name.eq_ignore_ascii_case("media") || at.name.eq_ignore_ascii_case("supports") {
                    replace_in(&mut at.params, replacements);
                }
                if let Some(children) = &mut at.nodes {
                    replace_symbols(children, replacements);
                }
            }
            CssNode::Comment(_) => {}
        }
    }
}
