#![allow(clippy::unwrap_used, clippy::expect_used)]

use cssm_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

fn roundtrip(source: &str) {
    let sheet = parse_stylesheet(source).unwrap();
    assert_eq!(sheet.to_css(), source);
}

#[test]
fn test_prints_back_unchanged() {
    roundtrip("");
    roundtrip("  \n");
    roundtrip(".a { color: red; }");
    roundtrip(".a{color:red}");
    roundtrip(".a ,\n.b {\n  color : red ;\n  margin: 0 !important\n}\n");
    roundtrip("@import url(x.css);\n@media screen and (min-width: 1px) { .a { b: c } }");
    roundtrip("@font-face{src:url(data:font/woff;base64,AAA)}");
    roundtrip("/* head */\n.a { /* inner */ b: c; }\n/* tail */");
    roundtrip(".a { content: \"}\"; }");
    roundtrip("@charset \"utf-8\"");
    roundtrip(".a { b: c;; };\n.d {}");
    roundtrip(":export {\n  a: b;\n}");
}

#[test]
fn test_structure() {
    let sheet = parse_stylesheet(".a { color: red !important; }\n@media print { .b { x: y } }").unwrap();
    assert_eq!(sheet.nodes.len(), 2);

    let CssNode::Rule(rule) = &sheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(rule.selector, ".a");
    assert_eq!(rule.offset, 0);
    let decl = rule.decls().next().unwrap();
    assert_eq!(decl.prop, "color");
    assert_eq!(decl.value, "red");
    assert_eq!(decl.important.as_deref(), Some(" !important"));
    assert_eq!(decl.offset, 5);

    let CssNode::AtRule(at) = &sheet.nodes[1] else {
        panic!("expected an at-rule");
    };
    assert_eq!(at.name, "media");
    assert_eq!(at.params, "print");
    assert_eq!(at.offset, 30);
    assert_eq!(at.nodes.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_statement_at_rule() {
    let sheet = parse_stylesheet("@import \"a.css\" screen;").unwrap();
    let CssNode::AtRule(at) = &sheet.nodes[0] else {
        panic!("expected an at-rule");
    };
    assert_eq!(at.params, "\"a.css\" screen");
    assert!(at.nodes.is_none());
    assert!(at.raws.semicolon);
}

#[test]
fn test_keyframes_detection() {
    let sheet = parse_stylesheet("@-webkit-KEYFRAMES a {} @media x {}").unwrap();
    let names: Vec<bool> = sheet
        .nodes
        .iter()
        .map(|n| matches!(n, CssNode::AtRule(at) if at.is_keyframes()))
        .collect();
    assert_eq!(names, vec![true, false]);
}

#[test]
fn test_synthesized_nodes() {
    let mut sheet = parse_stylesheet(".a {}").unwrap();
    let mut rule = Rule::synthetic(":export");
    rule.nodes.push(CssNode::Decl(Decl::new("a", "b")));
    sheet.insert_rule(0, rule);
    assert_eq!(sheet.to_css(), ":export {\n  a: b;\n}\n.a {}");

    sheet.insert_rule(usize::MAX, Rule::synthetic(".z"));
    assert_eq!(sheet.to_css(), ":export {\n  a: b;\n}\n.a {}\n.z {\n}");
}

#[test]
fn test_errors() {
    let err = parse_stylesheet(".a { b: c").unwrap_err();
    assert_eq!(err.code, ErrorCode::E0001);
    assert_eq!(err.message, "Unclosed block");
    assert_eq!(err.offset, 3);

    let err = parse_stylesheet(".a {} }").unwrap_err();
    assert_eq!(err.code, ErrorCode::E1001);
    assert_eq!(err.offset, 6);

    let err = parse_stylesheet(".a { color }").unwrap_err();
    assert_eq!(err.message, "Unknown word");
    assert_eq!(err.offset, 5);

    let err = parse_stylesheet(".a { content: \"x }").unwrap_err();
    assert_eq!(err.message, "Unclosed string");
    assert_eq!(err.offset, 14);

    let err = parse_stylesheet("/* open").unwrap_err();
    assert_eq!(err.message, "Unclosed comment");
}

#[test]
fn test_append_decl_terminates_previous() {
    let mut sheet = parse_stylesheet(":import(\"x\") { a: b }").unwrap();
    let CssNode::Rule(rule) = &mut sheet.nodes[0] else {
        panic!("expected a rule");
    };
    rule.append_decl(Decl::new("c", "d"));
    assert_eq!(sheet.to_css(), ":import(\"x\") { a: b ;\n  c: d;}");
}
