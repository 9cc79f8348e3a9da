//! Scope pass.
//!
//! Replaces every `:local(...)` left by local-by-default with generated
//! names, resolves `composes`, and appends an `:export` rule mapping each
//! local name to everything it stands for.

use cssm_diagnostic::{Diagnostic, ErrorCode};
use cssm_ir::{Attribute, Escaped, NodeId, NodeKind, NodeType, QuoteMark, SelectorTree, Spaces};
use rustc_hash::FxHashSet;

use crate::export::ScopedNames;
use crate::extract_imports::is_composes;
use crate::icss::collect_icss;
use crate::local_by_default::scoped_param;
use crate::names::ScopedNameGenerator;
use crate::sheet::{AtRule, CssNode, Decl, Rule, Stylesheet};

/// What the scope pass needs to know about the sheet it runs on.
#[derive(Clone, Copy, Debug)]
pub struct ScopeContext<'a> {
    pub generator: &'a dyn ScopedNameGenerator,
    /// Path handed to the generator.
    pub path: &'a str,
    /// Full source handed to the generator.
    pub source: &'a str,
    /// Also export global classes and ids, under their own names.
    pub export_globals: bool,
}

/// Run the scope pass over `sheet` and return its scoped names.
#[tracing::instrument(level = "debug", skip_all, fields(path = cx.path))]
pub fn scope(sheet: &mut Stylesheet, cx: &ScopeContext<'_>) -> Result<ScopedNames, Diagnostic> {
    let imported: FxHashSet<String> = collect_icss(&sheet.nodes)
        .aliases()
        .map(str::to_owned)
        .collect();
    let mut pass = Scope {
        cx,
        imported,
        names: ScopedNames::new(),
    };
    pass.rules(&mut sheet.nodes, false)?;
    pass.keyframes(&mut sheet.nodes);

    if !pass.names.is_empty() {
        let mut export = Rule::synthetic(":export");
        for (name, value) in pass.names.to_table().iter() {
            export.nodes.push(CssNode::Decl(Decl::new(name, value)));
        }
        sheet.nodes.push(CssNode::Rule(export));
    }
    tracing::debug!(exports = pass.names.iter().count(), "scoped sheet");
    Ok(pass.names)
}

fn type_name(ty: NodeType) -> &'static str {
    match ty {
        NodeType::Root => "root",
        NodeType::Selector => "selector",
        NodeType::ClassName => "class",
        NodeType::Id => "id",
        NodeType::Tag => "tag",
        NodeType::Universal => "universal",
        NodeType::Nesting => "nesting",
        NodeType::Combinator => "combinator",
        NodeType::Attribute => "attribute",
        NodeType::Pseudo => "pseudo",
        NodeType::String => "string",
        NodeType::Comment => "comment",
    }
}

/// First `:local(<name>)` in `text`, as the matched range and the name.
fn find_local_call(text: &str) -> Option<(usize, usize, &str)> {
    let mut search = 0;
    while let Some(found) = text[search..].find(":local") {
        let start = search + found;
        search = start + ":local".len();
        let rest = &text[search..];
        let Some(open) = rest.trim_start().strip_prefix('(') else {
            continue;
        };
        let open_at = text.len() - open.len();
        // At least one character, up to the first `)` after it.
        let Some(first) = open.chars().next() else {
            continue;
        };
        let Some(close) = open[first.len_utf8()..].find(')') else {
            continue;
        };
        let close_at = open_at + first.len_utf8() + close;
        return Some((start, close_at + 1, &text[open_at..close_at]));
    }
    None
}

/// Split a value on commas and quoted strings, keeping both as tokens.
fn value_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut segment_start = 0;
    let mut i = 0;
    while i < value.len() {
        let c = value.as_bytes()[i];
        let end = match c {
            b',' => Some(i + 1),
            b'\'' | b'"' => value[i + 1..].find(char::from(c)).map(|close| i + close + 2),
            _ => None,
        };
        match end {
            Some(end) => {
                tokens.push(&value[segment_start..i]);
                tokens.push(&value[i..end]);
                segment_start = end;
                i = end;
            }
            None => i += 1,
        }
    }
    tokens.push(&value[segment_start..]);
    tokens
}

struct Scope<'a> {
    cx: &'a ScopeContext<'a>,
    imported: FxHashSet<String>,
    names: ScopedNames,
}

impl Scope<'_> {
    fn export_scoped_name(&mut self, name: &str) -> String {
        let scoped = self.cx.generator.generate(name, self.cx.path, self.cx.source);
        self.names.push_unique(name, &scoped);
        scoped
    }

    fn rules(&mut self, nodes: &mut [CssNode], in_keyframes: bool) -> Result<(), Diagnostic> {
        for node in nodes {
            match node {
                CssNode::Rule(rule) => {
                    if !in_keyframes {
                        self.rule(rule)?;
                    }
                    self.local_values(rule);
                    self.rules(&mut rule.nodes, false)?;
                }
                CssNode::AtRule(at) => {
                    let keyframes = at.is_keyframes();
                    if let Some(children) = &mut at.nodes {
                        self.rules(children, keyframes)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn rule(&mut self, rule: &mut Rule) -> Result<(), Diagnostic> {
        let mut tree = cssm_parse::parse(&rule.selector).map_err(|e| e.offset_by(rule.offset))?;

        let local_names = if rule.decls().any(|d| is_composes(&d.prop)) {
            Some(single_local_names(&tree, &rule.selector).map_err(|e| e.offset_by(rule.offset))?)
        } else {
            None
        };

        let root = tree.root();
        self.traverse(&mut tree, root)
            .map_err(|e| e.offset_by(rule.offset))?;
        let selector = tree.to_string();
        if selector != rule.selector {
            tracing::trace!(from = %rule.selector, to = %selector, "scoped selector");
            rule.selector = selector;
        }

        if let Some(local_names) = local_names {
            let mut i = 0;
            while i < rule.nodes.len() {
                match &rule.nodes[i] {
                    CssNode::Decl(decl) if is_composes(&decl.prop) => {
                        self.composes(decl, &local_names)?;
                        rule.nodes.remove(i);
                    }
                    _ => i += 1,
                }
            }
        }
        Ok(())
    }

    fn traverse(&mut self, tree: &mut SelectorTree, id: NodeId) -> Result<(), Diagnostic> {
        let kind = tree.kind(id);
        match kind.node_type() {
            NodeType::Pseudo if kind.value() == Some(":local") && !tree.children(id).is_empty() => {
                self.replace_local(tree, id)
            }
            NodeType::Root | NodeType::Selector | NodeType::Pseudo => {
                for child in tree.children(id).to_vec() {
                    self.traverse(tree, child)?;
                }
                Ok(())
            }
            NodeType::ClassName | NodeType::Id if self.cx.export_globals => {
                if let Some(name) = kind.value() {
                    let name = name.to_owned();
                    self.names.set(&name, vec![name.clone()]);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Put the scoped contents of `:local(...)` where it stood.
    fn replace_local(&mut self, tree: &mut SelectorTree, pseudo: NodeId) -> Result<(), Diagnostic> {
        let &[selector] = tree.children(pseudo) else {
            return Err(Diagnostic::new(
                ErrorCode::E2007,
                "Unexpected comma (\",\") in :local block",
                tree.get(pseudo).source_index,
            ));
        };
        let nodes = tree.children(selector).to_vec();
        for &node in &nodes {
            self.localize(tree, node)?;
        }
        let spaces = tree.get(pseudo).spaces.clone();
        if let Some(&first) = nodes.first() {
            tree.get_mut(first).spaces = spaces;
        }
        tree.replace_with(pseudo, &nodes);
        Ok(())
    }

    /// Replace a class, id, or `[class=...]` with its scoped form.
    fn localize(&mut self, tree: &mut SelectorTree, id: NodeId) -> Result<(), Diagnostic> {
        let scoped = match tree.kind(id) {
            NodeKind::ClassName(name) => {
                NodeKind::ClassName(Escaped::identifier(self.export_scoped_name(name.value())))
            }
            NodeKind::Id(name) => {
                NodeKind::Id(Escaped::identifier(self.export_scoped_name(name.value())))
            }
            NodeKind::Attribute(attr)
                if attr.attribute.value() == "class"
                    && attr.operator.as_ref().is_some_and(|op| op.value() == "=") =>
            {
                let value = attr.value.as_ref().map(|v| v.value().to_owned()).unwrap_or_default();
                let scoped = self.export_scoped_name(&value);
                let mut attribute = Attribute {
                    attribute: Escaped::identifier("class"),
                    operator: Some(Escaped::verbatim("=")),
                    ..Attribute::default()
                };
                attribute.set_value(&scoped, Some(QuoteMark::Single));
                NodeKind::Attribute(Box::new(attribute))
            }
            kind => {
                return Err(Diagnostic::new(
                    ErrorCode::E2007,
                    format!(
                        "{} (\"{}\") is not allowed in a :local block",
                        type_name(kind.node_type()),
                        tree.print(id)
                    ),
                    tree.get(id).source_index,
                ));
            }
        };
        let node = tree.get_mut(id);
        node.kind = scoped;
        node.spaces = Spaces::default();
        Ok(())
    }

    fn composes(&mut self, decl: &Decl, local_names: &[String]) -> Result<(), Diagnostic> {
        let classes = decl
            .value
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|class| !class.is_empty());
        for class in classes {
            let global = class
                .strip_prefix("global(")
                .and_then(|c| c.strip_suffix(')'))
                .filter(|c| !c.is_empty() && !c.contains(')'));
            let values: Vec<String> = if let Some(global) = global {
                vec![global.to_owned()]
            } else if self.imported.contains(class) {
                vec![class.to_owned()]
            } else if let Some(existing) = self.names.get(class) {
                existing.to_vec()
            } else {
                return Err(Diagnostic::new(
                    ErrorCode::E2005,
                    format!("referenced class name \"{class}\" in {} not found", decl.prop),
                    decl.offset,
                ));
            };
            for name in local_names {
                for value in &values {
                    self.names.push(name, value);
                }
            }
        }
        Ok(())
    }

    /// `:local(x)` in declaration values, once per comma-separated part.
    fn local_values(&mut self, rule: &mut Rule) {
        for node in &mut rule.nodes {
            let CssNode::Decl(decl) = node else {
                continue;
            };
            if find_local_call(&decl.value).is_none() {
                continue;
            }
            let tokens = value_tokens(&decl.value);
            let mut value = String::with_capacity(decl.value.len());
            for (i, token) in tokens.iter().enumerate() {
                let after_comma = i == 0 || tokens[i - 1] == ",";
                match find_local_call(token).filter(|_| after_comma) {
                    Some((start, end, name)) => {
                        let scoped = self.export_scoped_name(name);
                        value.push_str(&token[..start]);
                        value.push_str(&scoped);
                        value.push_str(&token[end..]);
                    }
                    None => value.push_str(token),
                }
            }
            decl.value = value;
        }
    }

    /// `@keyframes :local(x)`.
    fn keyframes(&mut self, nodes: &mut [CssNode]) {
        for node in nodes {
            match node {
                CssNode::AtRule(at) => {
                    if at.is_keyframes() {
                        self.keyframes_name(at);
                    }
                    if let Some(children) = &mut at.nodes {
                        self.keyframes(children);
                    }
                }
                CssNode::Rule(rule) => self.keyframes(&mut rule.nodes),
                _ => {}
            }
        }
    }

    fn keyframes_name(&mut self, at: &mut AtRule) {
        if let Some(name) = scoped_param(&at.params, ":local") {
            let name = name.to_owned();
            at.params = self.export_scoped_name(&name);
        }
    }
}

/// The class each selector of a composing rule defines.
///
/// Composition is only defined for rules whose selectors are each a single
/// `:local(.name)`.
fn single_local_names(tree: &SelectorTree, selector: &str) -> Result<Vec<String>, Diagnostic> {
    let weird = |node: NodeId| {
        Diagnostic::new(
            ErrorCode::E2006,
            format!(
                "composition is only allowed when selector is single :local class name not in \"{selector}\", \"{}\" is weird",
                tree.print(node)
            ),
            tree.get(node).source_index,
        )
    };

    let mut names = Vec::new();
    for &sel in tree.children(tree.root()) {
        let &[node] = tree.children(sel) else {
            return Err(Diagnostic::new(
                ErrorCode::E2006,
                format!(
                    "composition is only allowed when selector is single :local class name not in \"{selector}\""
                ),
                tree.get(sel).source_index,
            ));
        };
        let is_local = tree.kind(node).value() == Some(":local")
            && tree.kind(node).node_type() == NodeType::Pseudo;
        let &[inner] = tree.children(node) else {
            return Err(weird(node));
        };
        if !is_local {
            return Err(weird(node));
        }
        let &[class] = tree.children(inner) else {
            return Err(weird(inner));
        };
        match tree.kind(class) {
            NodeKind::ClassName(name) => names.push(name.value().to_owned()),
            _ => return Err(weird(class)),
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests;
