//! Inspection commands: `tokens`, `parse`, `value`, and `unit`.

use cssm_ir::{NodeId, SelectorTree};
use cssm_lexer::Tokenizer;
use cssm_parse::{parse_with, ParseOptions};
use cssm_value::{ValueKind, ValueNode};

use super::fail;

/// Tokenize a selector and display the tokens.
pub fn tokenize_selector(selector: &str, safe: bool) {
    let stream = match Tokenizer::new().safe(safe).tokenize(selector) {
        Ok(stream) => stream,
        Err(err) => fail(&err, selector),
    };
    if stream.was_repaired() {
        println!("(input was repaired to {:?})", stream.source);
    }
    println!("Tokens for {selector:?} ({} tokens):", stream.tokens.len());
    for tok in &stream.tokens {
        println!(
            "  {} {}:{}-{}:{} {:?}",
            tok.kind.name(),
            tok.start_line,
            tok.start_col,
            tok.end_line,
            tok.end_col,
            tok.text(&stream.source),
        );
    }
}

/// Parse a selector and display its tree.
pub fn parse_selector(selector: &str, safe: bool, lossy: bool) {
    let options = ParseOptions::default().with_safe(safe).with_lossy(lossy);
    let tree = match parse_with(selector, options) {
        Ok(tree) => tree,
        Err(err) => fail(&err, selector),
    };
    print!("{}", dump_tree(&tree));
    println!("printed: {tree}");
}

/// Parse a value and display its nodes.
pub fn value_tree(value: &str) {
    let nodes = cssm_value::parse(value);
    print!("{}", dump_values(&nodes));
    println!("printed: {}", cssm_value::stringify(&nodes));
}

pub fn show_unit(value: &str) {
    match cssm_value::unit(value) {
        Some(unit) => println!("number: {}\nunit: {}", unit.number, unit.unit),
        None => println!("not a number"),
    }
}

fn dump_tree(tree: &SelectorTree) -> String {
    let mut out = String::new();
    dump_node(tree, tree.root(), 0, &mut out);
    out
}

fn dump_node(tree: &SelectorTree, id: NodeId, depth: usize, out: &mut String) {
    let kind = tree.kind(id);
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{:?}", kind.node_type()));
    if let Some(value) = kind.value() {
        out.push_str(&format!(" {value:?}"));
    }
    out.push('\n');
    for &child in tree.children(id) {
        dump_node(tree, child, depth + 1, out);
    }
}

fn value_kind_name(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Word => "word",
        ValueKind::Space => "space",
        ValueKind::UnicodeRange => "unicode-range",
        ValueKind::String { .. } => "string",
        ValueKind::Comment { .. } => "comment",
        ValueKind::Div { .. } => "div",
        ValueKind::Function { .. } => "function",
    }
}

fn dump_values(nodes: &[ValueNode]) -> String {
    let mut out = String::new();
    dump_value_nodes(nodes, 0, &mut out);
    out
}

fn dump_value_nodes(nodes: &[ValueNode], depth: usize, out: &mut String) {
    for node in nodes {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} {:?}\n", value_kind_name(&node.kind), node.value));
        if let ValueKind::Function { nodes, .. } = &node.kind {
            dump_value_nodes(nodes, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests;
