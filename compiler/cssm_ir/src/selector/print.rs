//! Selector stringification.

use super::{Attribute, Namespace, NodeId, NodeKind, SelectorTree};

pub(super) fn push_namespace(out: &mut String, ns: &Namespace) {
    if let Namespace::Named(prefix) = ns {
        out.push_str(prefix.printed());
    }
    out.push('|');
}

fn push_joined(tree: &SelectorTree, children: &[NodeId], sep: char, out: &mut String) {
    for (i, &child) in children.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        push_node(tree, child, out);
    }
}

pub(super) fn push_node(tree: &SelectorTree, id: NodeId, out: &mut String) {
    let node = tree.get(id);
    match &node.kind {
        NodeKind::Root { trailing_comma } => {
            push_joined(tree, node.children(), ',', out);
            if *trailing_comma {
                out.push(',');
            }
            return;
        }
        NodeKind::Selector => {
            out.push_str(&node.spaces.before);
            for &child in node.children() {
                push_node(tree, child, out);
            }
            out.push_str(&node.spaces.after);
            return;
        }
        _ => {}
    }

    out.push_str(&node.spaces.before);
    match &node.kind {
        NodeKind::ClassName(name) => {
            out.push('.');
            out.push_str(name.printed());
        }
        NodeKind::Id(name) => {
            out.push('#');
            out.push_str(name.printed());
        }
        NodeKind::Tag { value, namespace } => {
            if let Some(ns) = namespace {
                push_namespace(out, ns);
            }
            out.push_str(value.printed());
        }
        NodeKind::Universal { namespace } => {
            if let Some(ns) = namespace {
                push_namespace(out, ns);
            }
            out.push('*');
        }
        NodeKind::Nesting => out.push('&'),
        NodeKind::Combinator { value, raw } => out.push_str(raw.as_deref().unwrap_or(value)),
        NodeKind::Attribute(attr) => {
            push_attribute(attr, out);
            if !node.unclosed {
                out.push(']');
            }
        }
        NodeKind::Pseudo(value) => {
            out.push_str(value);
            if !node.children().is_empty() {
                out.push('(');
                push_joined(tree, node.children(), ',', out);
                if !node.unclosed {
                    out.push(')');
                }
            }
        }
        NodeKind::String(value) | NodeKind::Comment(value) => out.push_str(value),
        NodeKind::Root { .. } | NodeKind::Selector => {}
    }
    out.push_str(&node.spaces.after);
}

fn push_attribute(attr: &Attribute, out: &mut String) {
    out.push('[');
    out.push_str(&attr.spaces.attribute.before);
    out.push_str(&attr.qualified_name());
    out.push_str(&attr.spaces.attribute.after);

    if let (Some(operator), Some(value)) = (&attr.operator, &attr.value) {
        out.push_str(&attr.spaces.operator.before);
        out.push_str(operator.printed());
        out.push_str(&attr.spaces.operator.after);
        out.push_str(&attr.spaces.value.before);
        out.push_str(value.printed());
        out.push_str(&attr.spaces.value.after);

        let flag = attr
            .insensitive_raw
            .as_deref()
            .unwrap_or(if attr.insensitive { "i" } else { "" });
        if !flag.is_empty() {
            if attr.quote_mark.is_none()
                && attr.spaces.value.after.is_empty()
                && attr.spaces.insensitive.before.is_empty()
            {
                out.push(' ');
            }
            out.push_str(&attr.spaces.insensitive.before);
            out.push_str(flag);
            out.push_str(&attr.spaces.insensitive.after);
        }
    }
}
