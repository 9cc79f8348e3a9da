#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::escape::{Escaped, QuoteMark};
use pretty_assertions::assert_eq;

fn class(tree: &mut SelectorTree, name: &str) -> NodeId {
    tree.alloc_kind(NodeKind::ClassName(Escaped::identifier(name)))
}

/// `.a .b, #c`
fn sample() -> (SelectorTree, [NodeId; 6]) {
    let mut tree = SelectorTree::new();
    let root = tree.root();
    let first = tree.alloc_kind(NodeKind::Selector);
    let a = class(&mut tree, "a");
    let space = tree.alloc_kind(NodeKind::combinator(" "));
    let b = class(&mut tree, "b");
    tree.append(root, first);
    for id in [a, space, b] {
        tree.append(first, id);
    }
    let second = tree.alloc_kind(NodeKind::Selector);
    let c = tree.alloc(
        Node::new(NodeKind::Id(Escaped::identifier("c"))).with_spaces(Spaces::new(" ", "")),
    );
    tree.append(root, second);
    tree.append(second, c);
    (tree, [first, a, space, b, second, c])
}

#[test]
fn prints_selector_list() {
    let (tree, _) = sample();
    assert_eq!(tree.to_string(), ".a .b, #c");
}

#[test]
fn parent_links_follow_attachment() {
    let (tree, [first, a, _, b, _, _]) = sample();
    assert_eq!(tree.parent(a), Some(first));
    assert_eq!(tree.parent(first), Some(tree.root()));
    assert_eq!(tree.next_sibling(a).map(|s| tree.kind(s).is_spacing_combinator()), Some(true));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.last(first), Some(b));
}

#[test]
fn remove_nulls_parent_and_splices() {
    let (mut tree, [first, a, space, b, _, _]) = sample();
    tree.remove(space);
    assert_eq!(tree.parent(space), None);
    assert_eq!(tree.children(first), &[a, b]);
    assert_eq!(tree.print(first), ".a.b");
}

#[test]
fn append_moves_attached_node() {
    let (mut tree, [first, a, _, _, second, c]) = sample();
    tree.append(second, a);
    assert_eq!(tree.parent(a), Some(second));
    assert_eq!(tree.children(second), &[c, a]);
    assert_eq!(tree.children(first).len(), 2);
}

#[test]
fn insert_before_and_after() {
    let (mut tree, [first, a, _, b, _, _]) = sample();
    let x = class(&mut tree, "x");
    let y = class(&mut tree, "y");
    tree.insert_before(a, x);
    tree.insert_after(b, y);
    assert_eq!(tree.print(first), ".x.a .b.y");
}

#[test]
fn replace_with_several_nodes() {
    let (mut tree, [first, a, _, _, _, _]) = sample();
    let x = class(&mut tree, "x");
    let y = class(&mut tree, "y");
    tree.replace_with(a, &[x, y]);
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.print(first), ".x.y .b");
}

#[test]
fn each_tolerates_removal_of_later_siblings() {
    let (mut tree, [first, a, space, b, _, _]) = sample();
    let mut seen = Vec::new();
    tree.each(first, |tree, id| {
        seen.push(id);
        if id == a {
            tree.remove(space);
        }
        WalkControl::Continue
    });
    assert_eq!(seen, vec![a, b]);
}

#[test]
fn each_does_not_visit_inserted_nodes() {
    let (mut tree, [first, a, space, b, _, _]) = sample();
    let mut seen = Vec::new();
    tree.each(first, |tree, id| {
        seen.push(id);
        if id == a {
            let x = class(tree, "x");
            tree.insert_after(id, x);
        }
        WalkControl::Continue
    });
    assert_eq!(seen, vec![a, space, b]);
    assert_eq!(tree.print(first), ".a.x .b");
}

#[test]
fn walk_is_preorder_and_stoppable() {
    let (mut tree, [first, a, space, b, second, c]) = sample();
    let root = tree.root();
    let mut seen = Vec::new();
    tree.walk(root, |_, id| {
        seen.push(id);
        WalkControl::Continue
    });
    assert_eq!(seen, vec![first, a, space, b, second, c]);

    let mut count = 0;
    tree.walk(root, |_, _| {
        count += 1;
        if count == 2 {
            WalkControl::Stop
        } else {
            WalkControl::Continue
        }
    });
    assert_eq!(count, 2);
}

#[test]
fn walk_type_filters_by_tag() {
    let (mut tree, [_, a, _, b, _, _]) = sample();
    let root = tree.root();
    let mut classes = Vec::new();
    tree.walk_type(root, NodeType::ClassName, |_, id| {
        classes.push(id);
        WalkControl::Continue
    });
    assert_eq!(classes, vec![a, b]);
    assert!(tree.some(root, |k| matches!(k, NodeKind::Id(_))));
    assert!(!tree.some(root, |k| matches!(k, NodeKind::Nesting)));
}

#[test]
fn skip_children_prunes_pseudo_arguments() {
    let mut tree = SelectorTree::new();
    let root = tree.root();
    let sel = tree.alloc_kind(NodeKind::Selector);
    let not = tree.alloc_kind(NodeKind::Pseudo(":not".into()));
    let inner = tree.alloc_kind(NodeKind::Selector);
    let x = class(&mut tree, "x");
    tree.append(root, sel);
    tree.append(sel, not);
    tree.append(not, inner);
    tree.append(inner, x);
    assert_eq!(tree.to_string(), ":not(.x)");

    let mut seen = Vec::new();
    tree.walk(root, |tree, id| {
        seen.push(id);
        if matches!(tree.kind(id), NodeKind::Pseudo(_)) {
            WalkControl::SkipChildren
        } else {
            WalkControl::Continue
        }
    });
    assert_eq!(seen, vec![sel, not]);
}

#[test]
fn deep_clone_copies_detached_subtree() {
    let (mut tree, [first, ..]) = sample();
    let copy = tree.deep_clone(first);
    assert_eq!(tree.parent(copy), None);
    assert_eq!(tree.print(copy), ".a .b");
    let copied_a = tree.first(copy).unwrap();
    *tree.kind_mut(copied_a) = NodeKind::ClassName(Escaped::identifier("z"));
    assert_eq!(tree.print(first), ".a .b");
    assert_eq!(tree.print(copy), ".z .b");
}

#[test]
fn trailing_comma_prints() {
    let (mut tree, _) = sample();
    tree.set_trailing_comma(true);
    assert_eq!(tree.to_string(), ".a .b, #c,");
}

#[test]
fn attribute_printing() {
    let mut attr = Attribute {
        attribute: Escaped::verbatim("href"),
        operator: Some(Escaped::verbatim("^=")),
        ..Attribute::default()
    };
    attr.set_value("http://x", Some(QuoteMark::Double));
    attr.insensitive = true;

    let mut tree = SelectorTree::new();
    let root = tree.root();
    let sel = tree.alloc_kind(NodeKind::Selector);
    let node = tree.alloc_kind(NodeKind::Attribute(Box::new(attr)));
    tree.append(root, sel);
    tree.append(sel, node);
    assert_eq!(tree.to_string(), r#"[href^="http://x"i]"#);

    if let NodeKind::Attribute(attr) = tree.kind_mut(node) {
        attr.set_value("a b", None);
        attr.namespace = Some(Namespace::Named(Escaped::verbatim("svg")));
    }
    assert_eq!(tree.to_string(), r"[svg|href^=a\ b i]");
}

#[test]
fn namespaces_print_before_names() {
    let mut tree = SelectorTree::new();
    let root = tree.root();
    let sel = tree.alloc_kind(NodeKind::Selector);
    let tag = tree.alloc_kind(NodeKind::Tag {
        value: Escaped::verbatim("a"),
        namespace: Some(Namespace::Empty),
    });
    let star = tree.alloc_kind(NodeKind::Universal {
        namespace: Some(Namespace::Named(Escaped::with_raw("*", "*"))),
    });
    tree.append(root, sel);
    tree.append(sel, tag);
    tree.append(sel, star);
    assert_eq!(tree.to_string(), "|a*|*");
}
