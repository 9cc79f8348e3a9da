#![allow(clippy::unwrap_used, clippy::expect_used)]

use cssm_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;
use crate::sheet::parse_stylesheet;

fn extract(source: &str, strict: bool) -> Result<String, Diagnostic> {
    let mut sheet = parse_stylesheet(source)?;
    extract_imports(&mut sheet, strict)?;
    Ok(sheet.to_css())
}

#[test]
fn test_parse_composition() {
    assert_eq!(
        parse_composition("a b from \"./x.css\""),
        Some(Composition {
            names: vec!["a", "b"],
            source: Source::Path("./x.css"),
        })
    );
    assert_eq!(
        parse_composition(" (a  b) from './x.css' ").map(|c| c.names),
        Some(vec!["a", "b"])
    );
    assert_eq!(
        parse_composition("a from global").map(|c| c.source),
        Some(Source::Global)
    );
    assert_eq!(parse_composition("from from \"x\"").map(|c| c.names), Some(vec!["from"]));
    assert_eq!(parse_composition("a from x"), None);
    assert_eq!(parse_composition("afrom \"x\""), None);
    assert_eq!(parse_composition("a from \"x\" b"), None);
    assert_eq!(parse_composition("a from \"\""), None);
    assert_eq!(parse_composition("a b"), None);
}

#[test]
fn test_imported_name() {
    assert_eq!(imported_name("bar", 0), "i__imported_bar_0");
    assert_eq!(imported_name("a-b.c", 7), "i__imported_a_b_c_7");
}

#[test]
fn test_single_import() {
    assert_eq!(
        extract(".foo { composes: bar from \"./other.css\"; }", false).unwrap(),
        ":import(\"./other.css\") {\n  i__imported_bar_0: bar;\n}\n.foo { composes: i__imported_bar_0; }"
    );
}

#[test]
fn test_global_and_mixed_segments() {
    assert_eq!(
        extract(".a { composes: b c from './x.css', d from global }", false).unwrap(),
        ":import(\"./x.css\") {\n  i__imported_b_0: b;\n  i__imported_c_1: c;\n}\n\
         .a { composes: i__imported_b_0 i__imported_c_1, global(d) }"
    );
    assert_eq!(
        extract(".a { composes: d e from global }", false).unwrap(),
        ".a { composes: global(d) global(e) }"
    );
}

#[test]
fn test_local_compositions_untouched() {
    let source = ".a {}\n.b { composes: a; compose-with: c }";
    assert_eq!(extract(source, true).unwrap(), source);
}

#[test]
fn test_repeated_names_share_alias() {
    assert_eq!(
        extract(
            ".a { composes: x from \"./m.css\" }\n.b { composes: x y from \"./m.css\" }",
            false
        )
        .unwrap(),
        ":import(\"./m.css\") {\n  i__imported_x_0: x;\n  i__imported_y_1: y;\n}\n\
         .a { composes: i__imported_x_0 }\n.b { composes: i__imported_x_0 i__imported_y_1 }"
    );
}

#[test]
fn test_declaration_order_is_kept() {
    let out = extract(
        ".a { composes: x from \"./a.css\"; composes: y from \"./b.css\" }\n\
         .b { composes: z from \"./b.css\" }",
        true,
    )
    .unwrap();
    let a = out.find(":import(\"./a.css\")").unwrap();
    let b = out.find(":import(\"./b.css\")").unwrap();
    assert!(a < b);
    assert!(out.contains("i__imported_y_1: y;\n  i__imported_z_2: z;"));
}

const OPPOSITE_ORDERS: &str = ".a { composes: x from \"./a.css\"; composes: y from \"./b.css\" }\n\
     .b { composes: y from \"./b.css\"; composes: x from \"./a.css\" }";

#[test]
fn test_conflicting_order_strict() {
    let err = extract(OPPOSITE_ORDERS, true).unwrap_err();
    assert_eq!(err.code, ErrorCode::E3001);
    assert_eq!(
        err.message,
        "Failed to resolve order of composed modules `./b.css`, `./a.css`."
    );
    assert!(err.offset > 0);
}

#[test]
fn test_conflicting_order_lenient() {
    let out = extract(OPPOSITE_ORDERS, false).unwrap();
    assert_eq!(out.matches(":import(").count(), 2);
}

#[test]
fn test_new_import_after_existing() {
    assert_eq!(
        extract(
            ":import(\"./a.css\") { q: r }\n.x { composes: y from \"./b.css\" }",
            false
        )
        .unwrap(),
        ":import(\"./a.css\") { q: r }\n:import(\"./b.css\") {\n  i__imported_y_0: y;\n}\n\
         .x { composes: i__imported_y_0 }"
    );
}

#[test]
fn test_names_join_existing_import() {
    assert_eq!(
        extract(
            ":import(\"./a.css\") { q: r }\n.x { composes: y from \"./a.css\" }",
            false
        )
        .unwrap(),
        ":import(\"./a.css\") { q: r ;\n  i__imported_y_0: y;}\n.x { composes: i__imported_y_0 }"
    );
}

#[test]
fn test_nested_rules() {
    assert_eq!(
        extract("@media print { .a { composes: b from \"./b.css\" } }", false).unwrap(),
        ":import(\"./b.css\") {\n  i__imported_b_0: b;\n}\n\
         @media print { .a { composes: i__imported_b_0 } }"
    );
}
