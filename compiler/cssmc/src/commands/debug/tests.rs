#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_dump_tree() {
    let tree = cssm_parse::parse("a.b").unwrap();
    assert_eq!(
        dump_tree(&tree),
        "Root\n  Selector\n    Tag \"a\"\n    ClassName \"b\"\n"
    );
}

#[test]
fn test_dump_values() {
    let nodes = cssm_value::parse("1px solid");
    assert_eq!(
        dump_values(&nodes),
        "word \"1px\"\nspace \" \"\nword \"solid\"\n"
    );
}

#[test]
fn test_dump_values_nests_function_arguments() {
    let nodes = cssm_value::parse("url(a)");
    assert_eq!(dump_values(&nodes), "function \"url\"\n  word \"a\"\n");
}
