//! Tree shape, values, and positions.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{children, types};
use crate::{parse, parse_with, ParseOptions};
use cssm_ir::{Namespace, NodeKind, NodeType, Position, SourceSpan};
use pretty_assertions::assert_eq;

#[test]
fn compound_word_splits_at_class_and_id() {
    let tree = parse("a.b#c.d").unwrap();
    assert_eq!(
        types(&tree, 0),
        vec![
            NodeType::Tag,
            NodeType::ClassName,
            NodeType::Id,
            NodeType::ClassName
        ]
    );
    let values: Vec<_> = children(&tree, 0)
        .iter()
        .map(|&c| tree.kind(c).value().unwrap().to_owned())
        .collect();
    assert_eq!(values, vec!["a", "b", "c", "d"]);
}

#[test]
fn escaped_dot_stays_in_name() {
    let tree = parse(".a\\.b").unwrap();
    let ids = children(&tree, 0);
    assert_eq!(ids.len(), 1);
    match tree.kind(ids[0]) {
        NodeKind::ClassName(name) => {
            assert_eq!(name.value(), "a.b");
            assert_eq!(name.raw(), Some("a\\.b"));
        }
        other => panic!("expected class, got {other:?}"),
    }
}

#[test]
fn keyframe_percentage_is_one_tag() {
    let tree = parse("12.5%").unwrap();
    assert_eq!(types(&tree, 0), vec![NodeType::Tag]);
}

#[test]
fn combinator_values() {
    let tree = parse("a > b c~d").unwrap();
    let values: Vec<_> = children(&tree, 0)
        .iter()
        .filter(|&&c| tree.kind(c).node_type() == NodeType::Combinator)
        .map(|&c| tree.kind(c).value().unwrap().to_owned())
        .collect();
    assert_eq!(values, vec![">", " ", "~"]);
}

#[test]
fn explicit_combinator_owns_surrounding_spaces() {
    let tree = parse("a  >\tb").unwrap();
    let combinator = children(&tree, 0)[1];
    let node = tree.get(combinator);
    assert_eq!(node.spaces.before, "  ");
    assert_eq!(node.spaces.after, "\t");
}

#[test]
fn descendant_combinator_keeps_odd_whitespace_raw() {
    let tree = parse("a\nb").unwrap();
    match tree.kind(children(&tree, 0)[1]) {
        NodeKind::Combinator { value, raw } => {
            assert_eq!(value, " ");
            assert_eq!(raw.as_deref(), Some("\n"));
        }
        other => panic!("expected combinator, got {other:?}"),
    }
}

#[test]
fn named_combinator() {
    let tree = parse("a /deep/ b").unwrap();
    assert_eq!(
        tree.kind(children(&tree, 0)[1]),
        &NodeKind::combinator("/deep/")
    );
}

#[test]
fn pseudo_arguments_are_selectors() {
    let tree = parse("a:not(.b, .c)").unwrap();
    let pseudo = children(&tree, 0)[1];
    assert_eq!(tree.kind(pseudo), &NodeKind::Pseudo(":not".to_owned()));
    let args = tree.children(pseudo);
    assert_eq!(args.len(), 2);
    assert!(args
        .iter()
        .all(|&s| tree.kind(s).node_type() == NodeType::Selector));
    assert_eq!(tree.print(args[1]), " .c");
}

#[test]
fn non_pseudo_parentheses_extend_value() {
    let tree = parse("a(b c)").unwrap();
    assert_eq!(tree.kind(children(&tree, 0)[0]).value(), Some("a(b c)"));
}

#[test]
fn list_of_selectors() {
    let tree = parse("a, b,c").unwrap();
    assert_eq!(tree.children(tree.root()).len(), 3);
    assert_eq!(tree.get(children(&tree, 1)[0]).spaces.before, " ");
}

#[test]
fn trailing_comma_is_recorded() {
    let tree = parse("a,").unwrap();
    assert_eq!(tree.children(tree.root()).len(), 1);
    assert_eq!(
        tree.kind(tree.root()),
        &NodeKind::Root {
            trailing_comma: true
        }
    );
}

#[test]
fn namespaced_tag() {
    let tree = parse("svg|circle").unwrap();
    match tree.kind(children(&tree, 0)[0]) {
        NodeKind::Tag {
            value,
            namespace: Some(Namespace::Named(prefix)),
        } => {
            assert_eq!(value.value(), "circle");
            assert_eq!(prefix.value(), "svg");
        }
        other => panic!("expected namespaced tag, got {other:?}"),
    }
}

#[test]
fn empty_namespace_universal() {
    let tree = parse("|*").unwrap();
    assert_eq!(
        tree.kind(children(&tree, 0)[0]),
        &NodeKind::Universal {
            namespace: Some(Namespace::Empty)
        }
    );
}

#[test]
fn comments_become_nodes() {
    let tree = parse("a/*x*/b").unwrap();
    assert_eq!(
        types(&tree, 0),
        vec![NodeType::Tag, NodeType::Comment, NodeType::Tag]
    );
}

#[test]
fn whitespace_only_selector_keeps_its_spaces() {
    let tree = parse(":not( )").unwrap();
    let pseudo = children(&tree, 0)[0];
    let selector = tree.children(pseudo)[0];
    let only = tree.children(selector)[0];
    assert_eq!(tree.kind(only), &NodeKind::String(String::new()));
    assert_eq!(tree.get(only).spaces.before, " ");
}

#[test]
fn source_positions() {
    let tree = parse(".a\n  #b").unwrap();
    let ids = children(&tree, 0);
    let class = tree.get(ids[0]);
    assert_eq!(
        class.source,
        Some(SourceSpan::new(Position::new(1, 1), Position::new(1, 2)))
    );
    assert_eq!(class.source_index, 0);

    let id = tree.get(ids[2]);
    assert_eq!(
        id.source,
        Some(SourceSpan::new(Position::new(2, 3), Position::new(2, 4)))
    );
    assert_eq!(id.source_index, 5);

    let selector = tree.get(tree.children(tree.root())[0]);
    assert_eq!(
        selector.source,
        Some(SourceSpan::new(Position::new(1, 1), Position::new(2, 4)))
    );
}

#[test]
fn split_word_columns() {
    let tree = parse("a.bc").unwrap();
    let class = tree.get(children(&tree, 0)[1]);
    assert_eq!(
        class.source,
        Some(SourceSpan::new(Position::new(1, 2), Position::new(1, 4)))
    );
    assert_eq!(class.source_index, 1);
}

#[test]
fn pseudo_span_covers_arguments() {
    let tree = parse(":not(a)").unwrap();
    let pseudo = tree.get(children(&tree, 0)[0]);
    assert_eq!(
        pseudo.source,
        Some(SourceSpan::new(Position::new(1, 1), Position::new(1, 7)))
    );
}

#[test]
fn safe_mode_closes_strings() {
    let tree = parse_with("a \"b", ParseOptions::default().with_safe(true)).unwrap();
    assert_eq!(tree.to_string(), "a \"b\"");
    let last = *children(&tree, 0).last().unwrap();
    assert_eq!(tree.kind(last), &NodeKind::String("\"b\"".to_owned()));
}

#[test]
fn safe_mode_closes_comments() {
    let tree = parse_with("a/*b", ParseOptions::default().with_safe(true)).unwrap();
    assert_eq!(tree.to_string(), "a/*b*/");
}

#[test]
fn leading_combinator_keeps_selector_start_space() {
    let tree = parse(":has( > img)").unwrap();
    let pseudo = children(&tree, 0)[0];
    let selector = tree.children(pseudo)[0];
    let combinator = tree.children(selector)[0];
    assert_eq!(tree.kind(combinator), &NodeKind::combinator(">"));
    assert_eq!(tree.get(combinator).spaces.before, " ");
    assert_eq!(tree.get(combinator).spaces.after, " ");
}

#[test]
fn safe_mode_closes_attribute() {
    let tree = parse_with("a[b=c", ParseOptions::default().with_safe(true)).unwrap();
    let attr = children(&tree, 0)[1];
    assert!(tree.get(attr).unclosed);
    match tree.kind(attr) {
        NodeKind::Attribute(attr) => {
            assert_eq!(attr.attribute.value(), "b");
            assert_eq!(attr.value.as_ref().map(|v| v.value()), Some("c"));
        }
        other => panic!("expected attribute, got {other:?}"),
    }
    assert_eq!(tree.to_string(), "a[b=c");
}

#[test]
fn safe_mode_closes_pseudo_arguments() {
    let tree = parse_with(":not(.a, .b", ParseOptions::default().with_safe(true)).unwrap();
    let pseudo = children(&tree, 0)[0];
    assert!(tree.get(pseudo).unclosed);
    assert_eq!(tree.children(pseudo).len(), 2);
    assert_eq!(
        tree.get(pseudo).source,
        Some(SourceSpan::new(Position::new(1, 1), Position::new(1, 11)))
    );
    assert_eq!(tree.to_string(), ":not(.a, .b");
}

#[test]
fn safe_mode_does_not_excuse_stray_closers() {
    let safe = ParseOptions::default().with_safe(true);
    assert!(parse_with("a]", safe).is_err());
    assert!(parse_with("a)", safe).is_err());
    assert!(parse_with("[", safe).is_err());
}
