#![allow(clippy::unwrap_used, clippy::expect_used)]

use cssm_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;
use crate::names::PathScoped;
use crate::sheet::parse_stylesheet;

fn run_with(source: &str, export_globals: bool) -> Result<(String, ScopedNames), Diagnostic> {
    let mut sheet = parse_stylesheet(source)?;
    let cx = ScopeContext {
        generator: &PathScoped,
        path: "/app.css",
        source,
        export_globals,
    };
    let names = scope(&mut sheet, &cx)?;
    Ok((sheet.to_css(), names))
}

fn run(source: &str) -> (String, ScopedNames) {
    run_with(source, false).unwrap()
}

fn error(source: &str) -> Diagnostic {
    run_with(source, false).unwrap_err()
}

fn names(table: &ScopedNames) -> Vec<(String, String)> {
    table
        .to_table()
        .iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn test_scopes_class_and_appends_export() {
    let (css, table) = run(":local(.foo) { color: red }");
    assert_eq!(
        css,
        "._app__foo { color: red }\n:export {\n  foo: _app__foo;\n}"
    );
    assert_eq!(names(&table), pairs(&[("foo", "_app__foo")]));
}

#[test]
fn test_scopes_ids_and_keeps_structure() {
    let (css, _) = run(":local(.a) > div:local(#b):hover {}");
    assert!(css.starts_with("._app__a > div#_app__b:hover {}"));
}

#[test]
fn test_scopes_class_attribute() {
    let (css, table) = run(":local([class=foo]) {}");
    assert!(css.starts_with("[class='_app__foo'] {}"));
    assert_eq!(names(&table), pairs(&[("foo", "_app__foo")]));
}

#[test]
fn test_escaped_names() {
    let (css, table) = run(":local(.a\\.b) {}");
    assert!(css.starts_with("._app__a\\.b {}"));
    assert_eq!(names(&table), pairs(&[("a.b", "_app__a.b")]));
}

#[test]
fn test_exports_key_by_unescaped_name() {
    let (css, table) = run(":local(.a\\:b) {}\n:local(.c) { composes: a:b }");
    assert!(css.starts_with("._app__a\\:b {}\n._app__c"), "{css}");
    assert_eq!(
        names(&table),
        pairs(&[("a:b", "_app__a:b"), ("c", "_app__c _app__a:b")])
    );
}

#[test]
fn test_nothing_local_adds_no_export() {
    let (css, table) = run(".a { color: red }");
    assert_eq!(css, ".a { color: red }");
    assert!(table.is_empty());
}

#[test]
fn test_composes() {
    let (css, table) = run(
        ":import(\"./x.css\") { i__imported_x_0: x }\n\
         :local(.a) {}\n\
         :local(.b) { composes: a global(c) i__imported_x_0; color: red }",
    );
    assert!(css.contains("._app__b { color: red }"));
    assert!(!css.contains("composes"));
    assert_eq!(
        names(&table),
        pairs(&[
            ("a", "_app__a"),
            ("b", "_app__b _app__a c i__imported_x_0"),
        ])
    );
}

#[test]
fn test_composes_on_every_selector() {
    let (_, table) = run(":local(.a) {}\n:local(.b), :local(.c) { compose-with: a }");
    assert_eq!(
        names(&table),
        pairs(&[
            ("a", "_app__a"),
            ("b", "_app__b _app__a"),
            ("c", "_app__c _app__a"),
        ])
    );
}

#[test]
fn test_composes_unknown_class() {
    let err = error(":local(.b) { composes: nope }");
    assert_eq!(err.code, ErrorCode::E2005);
    assert_eq!(err.message, "referenced class name \"nope\" in composes not found");
    assert_eq!(err.offset, 13);
}

#[test]
fn test_composes_needs_single_local_class() {
    let err = error(":local(.a) {}\n:local(.b) :local(.c) { composes: a }");
    assert_eq!(err.code, ErrorCode::E2006);
    assert_eq!(
        err.message,
        "composition is only allowed when selector is single :local class name not in \":local(.b) :local(.c)\""
    );

    let err = error(".x { composes: a }");
    assert_eq!(err.code, ErrorCode::E2006);
    assert!(err.message.ends_with("\".x\" is weird"));
}

#[test]
fn test_invalid_local_content() {
    let err = error(":local(.a, .b) {}");
    assert_eq!(err.code, ErrorCode::E2007);
    assert_eq!(err.message, "Unexpected comma (\",\") in :local block");

    let err = error(":local(div) {}");
    assert_eq!(err.code, ErrorCode::E2007);
    assert_eq!(err.message, "tag (\"div\") is not allowed in a :local block");
}

#[test]
fn test_local_in_values() {
    let (css, table) = run(":local(.a) { animation: :local(fade) 1s, :local(spin) 2s }");
    assert!(css.starts_with("._app__a { animation: _app__fade 1s, _app__spin 2s }"));
    assert_eq!(
        names(&table),
        pairs(&[
            ("a", "_app__a"),
            ("fade", "_app__fade"),
            ("spin", "_app__spin"),
        ])
    );
}

#[test]
fn test_local_in_values_skips_quoted_parts() {
    let (css, _) = run(".a { content: \":local(x)\" }");
    assert!(css.starts_with(".a { content: \":local(x)\" }"));
}

#[test]
fn test_local_keyframes() {
    let (css, table) = run("@keyframes :local(fade) { from { opacity: 0 } }");
    assert!(css.starts_with("@keyframes _app__fade { from { opacity: 0 } }"));
    assert_eq!(names(&table), pairs(&[("fade", "_app__fade")]));
}

#[test]
fn test_export_globals() {
    let (_, table) = run_with(".g :local(.a) #h {}", true).unwrap();
    assert_eq!(
        names(&table),
        pairs(&[("g", "g"), ("a", "_app__a"), ("h", "h")])
    );
}

#[test]
fn test_find_local_call() {
    assert_eq!(find_local_call("x :local(a) y"), Some((2, 11, "a")));
    assert_eq!(find_local_call(":local (a)"), Some((0, 10, "a")));
    assert_eq!(find_local_call(":local"), None);
    assert_eq!(find_local_call(":local x :local(b)"), Some((9, 18, "b")));
}

#[test]
fn test_value_tokens() {
    assert_eq!(value_tokens("a, 'b,c' d"), vec!["a", ",", " ", "'b,c'", " d"]);
    assert_eq!(value_tokens("'open"), vec!["'open"]);
}
