//! Extract imports.
//!
//! Rewrites `composes: a b from "./x.css"` to generated aliases and moves
//! the imported names into `:import("./x.css")` rules:
//!
//! ```css
//! :import("./x.css") { i__imported_a_0: a; i__imported_b_1: b; }
//! .c { composes: i__imported_a_0 i__imported_b_1; }
//! ```
//!
//! `from global` wraps each name in `global(...)` instead. Import rules are
//! emitted in an order consistent with the order every rule declared its
//! imports, see [`ImportGraph`].

use cssm_diagnostic::{Diagnostic, ErrorCode};
use rustc_hash::FxHashMap;

use crate::graph::ImportGraph;
use crate::icss::quoted_import_path;
use crate::sheet::{CssNode, Decl, Rule, Stylesheet};

/// Where composed names come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Source<'a> {
    Global,
    Path(&'a str),
}

/// One `<names> from <source>` composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Composition<'a> {
    pub(crate) names: Vec<&'a str>,
    pub(crate) source: Source<'a>,
}

/// `composes` and `compose-with`.
pub(crate) fn is_composes(prop: &str) -> bool {
    prop.eq_ignore_ascii_case("composes") || prop.eq_ignore_ascii_case("compose-with")
}

fn composition_source(text: &str) -> Option<Source<'_>> {
    if text == "global" {
        return Some(Source::Global);
    }
    let quote = text.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let path = text.strip_prefix(quote)?.strip_suffix(quote)?;
    (!path.is_empty() && !path.contains(quote)).then_some(Source::Path(path))
}

/// Parse `a b from "./x.css"`, `(a b) from './x.css'`, or `a from global`.
pub(crate) fn parse_composition(segment: &str) -> Option<Composition<'_>> {
    let segment = segment.trim();
    let mut search = 0;
    while let Some(found) = segment[search..].find("from") {
        let at = search + found;
        search = at + "from".len();
        let names = &segment[..at];
        let rest = &segment[search..];
        let spaced_before = names.ends_with(|c: char| c.is_ascii_whitespace());
        let spaced_after = rest.starts_with(|c: char| c.is_ascii_whitespace());
        if !spaced_before || !spaced_after {
            continue;
        }
        let names = names.trim_end();
        if names.is_empty() {
            continue;
        }
        let Some(source) = composition_source(rest.trim_start()) else {
            continue;
        };
        let names = names
            .strip_prefix('(')
            .and_then(|n| n.strip_suffix(')'))
            .unwrap_or(names);
        return Some(Composition {
            names: names.split_ascii_whitespace().collect(),
            source,
        });
    }
    None
}

/// `i__imported_<name>_<n>`, with non-word characters of `name` as `_`.
fn imported_name(name: &str, index: usize) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("i__imported_{name}_{index}")
}

#[derive(Default)]
struct Extractor {
    graph: ImportGraph,
    /// Path to the names imported from it, as `(name, alias)`.
    imports: FxHashMap<String, Vec<(String, String)>>,
    /// Offset of the last composition importing each path.
    decl_offsets: FxHashMap<String, u32>,
    next_alias: usize,
}

impl Extractor {
    fn alias(&mut self, path: &str, name: &str) -> String {
        let names = self.imports.entry(path.to_owned()).or_default();
        if let Some((_, alias)) = names.iter().find(|(n, _)| n == name) {
            return alias.clone();
        }
        let alias = imported_name(name, self.next_alias);
        self.next_alias += 1;
        names.push((name.to_owned(), alias.clone()));
        alias
    }

    /// Rewrite the composition declarations under `nodes`.
    ///
    /// `chain` holds the index of every enclosing node, each followed by
    /// `_`; together with the selector it identifies the declaring rule.
    fn walk(&mut self, nodes: &mut [CssNode], chain: &str, selector: &str) {
        for (i, node) in nodes.iter_mut().enumerate() {
            match node {
                CssNode::Decl(decl) if is_composes(&decl.prop) => {
                    self.composes(decl, &format!("_{chain}{selector}"));
                }
                CssNode::Rule(rule) => {
                    self.walk(&mut rule.nodes, &format!("{chain}{i}_"), &rule.selector);
                }
                CssNode::AtRule(at) => {
                    if let Some(children) = &mut at.nodes {
                        self.walk(children, &format!("{chain}{i}_"), "");
                    }
                }
                _ => {}
            }
        }
    }

    fn composes(&mut self, decl: &mut Decl, parent: &str) {
        let mut changed = false;
        let mut segments = Vec::new();
        for segment in decl.value.split(',') {
            let Some(composition) = parse_composition(segment) else {
                segments.push(segment.trim().to_owned());
                continue;
            };
            changed = true;
            let names: Vec<String> = match composition.source {
                Source::Global => composition
                    .names
                    .iter()
                    .map(|name| format!("global({name})"))
                    .collect(),
                Source::Path(path) => {
                    self.graph.add_import(path, parent);
                    self.decl_offsets.insert(path.to_owned(), decl.offset);
                    composition
                        .names
                        .iter()
                        .map(|name| self.alias(path, name))
                        .collect()
                }
            };
            segments.push(names.join(" "));
        }
        if changed {
            decl.value = segments.join(", ");
        }
    }
}

/// Run extract-imports over `sheet`.
///
/// With `strict`, imports declared in opposite orders by different rules
/// are an error; otherwise one of the conflicting constraints is dropped.
#[tracing::instrument(level = "debug", skip_all, fields(strict = strict))]
pub fn extract_imports(sheet: &mut Stylesheet, strict: bool) -> Result<(), Diagnostic> {
    let mut extractor = Extractor::default();

    let mut existing: FxHashMap<String, usize> = FxHashMap::default();
    for (i, node) in sheet.nodes.iter().enumerate() {
        if let Some(path) = node.as_rule().and_then(|r| quoted_import_path(&r.selector)) {
            extractor.graph.add_import(path, "root");
            existing.insert(path.to_owned(), i);
        }
    }

    extractor.walk(&mut sheet.nodes, "", "");
    if extractor.imports.is_empty() {
        return Ok(());
    }

    let order = extractor.graph.resolve_order(strict).map_err(|conflict| {
        let nodes = [conflict.first.as_str(), conflict.second.as_str()];
        let offset = nodes
            .iter()
            .find_map(|path| extractor.decl_offsets.get(*path))
            .copied()
            .unwrap_or(0);
        Diagnostic::new(
            ErrorCode::E3001,
            format!(
                "Failed to resolve order of composed modules `{}`, `{}`.",
                conflict.first, conflict.second
            ),
            offset,
        )
    })?;
    tracing::debug!(imports = order.len(), "resolved import order");

    let mut last_import: Option<usize> = None;
    for path in &order {
        let names = extractor.imports.get(path.as_str());
        let found = existing.get(path.as_str()).copied();
        let index = match found {
            Some(index) => index,
            None if names.is_some() => {
                let at = last_import.map_or(0, |last| last + 1);
                sheet.insert_rule(at, Rule::synthetic(format!(":import(\"{path}\")")));
                for index in existing.values_mut() {
                    if *index >= at {
                        *index += 1;
                    }
                }
                at
            }
            None => continue,
        };
        last_import = Some(index);

        let (Some(names), Some(CssNode::Rule(rule))) = (names, sheet.nodes.get_mut(index)) else {
            continue;
        };
        for (name, alias) in names {
            rule.append_decl(Decl::new(alias.as_str(), name.as_str()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
