//! Minimal stylesheet model.
//!
//! Enough structure to find rules, at-rules, declarations, and comments.
//! Selectors, at-rule preludes, and declaration values stay as text; the
//! passes parse them on demand with `cssm_parse` and `cssm_value`. Every
//! byte of whitespace lives in a `raws` field, so a sheet no pass touched
//! prints back unchanged.

mod parse;

use std::fmt;

pub use parse::parse_stylesheet;

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<CssNode>,
    /// Whitespace after the last node.
    pub after: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssNode {
    Rule(Rule),
    AtRule(AtRule),
    Decl(Decl),
    Comment(Comment),
}

/// `selector { ... }`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<CssNode>,
    pub raws: BlockRaws,
    /// Byte offset of the selector.
    pub offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockRaws {
    pub before: String,
    /// Between the selector and `{`.
    pub between: String,
    /// Before the closing `}`.
    pub after: String,
}

/// `@name params;` or `@name params { ... }`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    /// `None` for statement at-rules such as `@import`.
    pub nodes: Option<Vec<CssNode>>,
    pub raws: AtRuleRaws,
    pub offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AtRuleRaws {
    pub before: String,
    pub after_name: String,
    /// Between the params and `{` or `;`.
    pub between: String,
    pub after: String,
    /// A statement at-rule ended with `;`.
    pub semicolon: bool,
}

/// `prop: value`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decl {
    pub prop: String,
    pub value: String,
    /// `!important` as written, with the whitespace before it.
    pub important: Option<String>,
    pub raws: DeclRaws,
    pub offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclRaws {
    pub before: String,
    /// From the end of the property through the whitespace after `:`.
    pub between: String,
    /// Between the value and `;`.
    pub after: String,
    pub semicolon: bool,
}

/// `/* text */`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub before: String,
    pub offset: u32,
}

impl Rule {
    /// A rule built by a pass rather than read from source.
    pub fn synthetic(selector: impl Into<String>) -> Self {
        Rule {
            selector: selector.into(),
            nodes: Vec::new(),
            raws: BlockRaws {
                before: "\n".to_owned(),
                between: " ".to_owned(),
                after: "\n".to_owned(),
            },
            offset: 0,
        }
    }

    /// Declarations directly inside this rule.
    pub fn decls(&self) -> impl Iterator<Item = &Decl> {
        self.nodes.iter().filter_map(CssNode::as_decl)
    }

    /// Append `decl`, terminating the previous declaration if needed.
    pub fn append_decl(&mut self, decl: Decl) {
        if let Some(CssNode::Decl(last)) = self.nodes.last_mut() {
            last.raws.semicolon = true;
        }
        self.nodes.push(CssNode::Decl(decl));
    }
}

impl Decl {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Decl {
            prop: prop.into(),
            value: value.into(),
            important: None,
            raws: DeclRaws {
                before: "\n  ".to_owned(),
                between: ": ".to_owned(),
                after: String::new(),
                semicolon: true,
            },
            offset: 0,
        }
    }
}

impl AtRule {
    /// `@keyframes`, `@-webkit-keyframes`, and the like.
    pub fn is_keyframes(&self) -> bool {
        ends_with_ignore_case(&self.name, "keyframes")
    }
}

impl CssNode {
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            CssNode::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_decl(&self) -> Option<&Decl> {
        match self {
            CssNode::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    /// Whitespace printed before the node.
    pub fn before_mut(&mut self) -> &mut String {
        match self {
            CssNode::Rule(rule) => &mut rule.raws.before,
            CssNode::AtRule(at) => &mut at.raws.before,
            CssNode::Decl(decl) => &mut decl.raws.before,
            CssNode::Comment(comment) => &mut comment.before,
        }
    }
}

/// ASCII case-insensitive suffix test, used for vendor-prefixed names.
pub(crate) fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.len() >= suffix.len()
        && text.is_char_boundary(text.len() - suffix.len())
        && text[text.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

impl Stylesheet {
    /// Insert a synthesized rule at `index`, keeping one line break between
    /// it and its neighbours.
    pub fn insert_rule(&mut self, index: usize, mut rule: Rule) {
        let index = index.min(self.nodes.len());
        if index == 0 {
            rule.raws.before.clear();
            if let Some(next) = self.nodes.first_mut() {
                let before = next.before_mut();
                if before.is_empty() {
                    before.push('\n');
                }
            }
        }
        self.nodes.insert(index, CssNode::Rule(rule));
    }

    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_nodes(&self.nodes, &mut out);
        out.push_str(&self.after);
        out
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn write_nodes(nodes: &[CssNode], out: &mut String) {
    for node in nodes {
        write_node(node, out);
    }
}

fn write_node(node: &CssNode, out: &mut String) {
    match node {
        CssNode::Rule(rule) => {
            out.push_str(&rule.raws.before);
            out.push_str(&rule.selector);
            out.push_str(&rule.raws.between);
            out.push('{');
            write_nodes(&rule.nodes, out);
            out.push_str(&rule.raws.after);
            out.push('}');
        }
        CssNode::AtRule(at) => {
            out.push_str(&at.raws.before);
            out.push('@');
            out.push_str(&at.name);
            out.push_str(&at.raws.after_name);
            out.push_str(&at.params);
            out.push_str(&at.raws.between);
            match &at.nodes {
                Some(nodes) => {
                    out.push('{');
                    write_nodes(nodes, out);
                    out.push_str(&at.raws.after);
                    out.push('}');
                }
                None if at.raws.semicolon => out.push(';'),
                None => {}
            }
        }
        CssNode::Decl(decl) => {
            out.push_str(&decl.raws.before);
            out.push_str(&decl.prop);
            out.push_str(&decl.raws.between);
            out.push_str(&decl.value);
            if let Some(important) = &decl.important {
                out.push_str(important);
            }
            out.push_str(&decl.raws.after);
            if decl.raws.semicolon {
                out.push(';');
            }
        }
        CssNode::Comment(comment) => {
            out.push_str(&comment.before);
            out.push_str("/*");
            out.push_str(&comment.text);
            out.push_str("*/");
        }
    }
}

#[cfg(test)]
mod tests;
