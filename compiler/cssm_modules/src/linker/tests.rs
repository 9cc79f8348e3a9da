#![allow(clippy::unwrap_used, clippy::expect_used)]

use cssm_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

fn table(entries: &[(&str, &str)]) -> ExportTable {
    entries.iter().copied().collect()
}

fn composes_other() -> Result<crate::processor::Output, Diagnostic> {
    let mut loader = StaticLoader::new().with("./other.css", table(&[("bar", "other_bar_1")]));
    Processor::default().load(
        ".foo { composes: bar from \"./other.css\" }",
        "/app.css",
        &TraceKey::root(0),
        &mut loader,
    )
}

#[test]
fn test_link_resolves_imported_names() {
    let output = composes_other().unwrap();
    assert_eq!(output.exports, table(&[("foo", "_app__foo other_bar_1")]));
    assert!(output.css.trim_start().starts_with("._app__foo {"));
    assert!(!output.css.contains(":import"));
    assert!(!output.css.contains(":export"));
}

#[test]
fn test_link_missing_export() {
    let mut loader = StaticLoader::new().with("./other.css", table(&[("baz", "x")]));
    let err = Processor::default()
        .load(
            ".foo { composes: bar from \"./other.css\" }",
            "/app.css",
            &TraceKey::root(0),
            &mut loader,
        )
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::E3002);
    assert_eq!(err.message, "\"bar\" is not exported by \"./other.css\"");
    assert_eq!(err.file.as_deref(), Some("/app.css"));
}

#[test]
fn test_static_loader_missing_module() {
    let err = StaticLoader::new()
        .fetch("./x.css", "/app.css", &TraceKey::root(0))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::E3002);
    assert_eq!(err.message, "cannot find module \"./x.css\"");
}

#[test]
fn test_link_replaces_symbols_everywhere() {
    let mut sheet = crate::sheet::parse_stylesheet(
        ":import(\"./c.css\") { blue: primary }\n.a { color: blue }\n:export { a: blue }",
    )
    .unwrap();
    let mut loader = StaticLoader::new().with("./c.css", table(&[("primary", "#00f")]));
    let exports = link(&mut sheet, "/app.css", &TraceKey::root(0), &mut loader).unwrap();
    assert_eq!(exports, table(&[("a", "#00f")]));
    assert_eq!(sheet.to_css(), "\n.a { color: #00f }");
}

#[test]
fn test_resolve_path() {
    assert_eq!(resolve_path("./b.css", "/src/a.css"), "/src/b.css");
    assert_eq!(resolve_path("../b.css", "/src/a.css"), "/b.css");
    assert_eq!(resolve_path("/x/y.css", "/src/a.css"), "/x/y.css");
    assert_eq!(resolve_path("b.css", "/src/a.css"), "/b.css");
    assert_eq!(resolve_path("./a.css", "/"), "/a.css");
    assert_eq!(resolve_path("../../x.css", "/a.css"), "/x.css");
}

#[test]
fn test_memory_loader_orders_dependencies_first() {
    let mut loader = MemoryLoader::new(Processor::default())
        .with_file("/a.css", ".a { composes: b from \"./b.css\"; color: red }")
        .with_file("/b.css", ".b { color: blue }");
    let exports = loader.load("/a.css").unwrap();
    assert_eq!(exports, table(&[("a", "_a__a _b__b")]));
    assert_eq!(
        loader.final_source(),
        "._b__b { color: blue }\n._a__a { color: red }"
    );
    assert_eq!(loader.exports("b.css"), Some(&table(&[("b", "_b__b")])));
}

#[test]
fn test_memory_loader_siblings_in_declaration_order() {
    let mut loader = MemoryLoader::new(Processor::default())
        .with_file(
            "/main.css",
            ".m { composes: x from \"./c.css\"; composes: y from \"./b.css\" }",
        )
        .with_file("/b.css", ".y { color: blue }")
        .with_file("/c.css", ".x { color: cyan }");
    loader.load("/main.css").unwrap();
    let css = loader.final_source();
    let c = css.find("._c__x").unwrap();
    let b = css.find("._b__y").unwrap();
    let m = css.find("._main__m").unwrap();
    assert!(c < b && b < m, "{css}");
}

#[test]
fn test_memory_loader_processes_shared_dependency_once() {
    let mut loader = MemoryLoader::new(Processor::default())
        .with_file("/a.css", ".a { composes: c from \"./c.css\" }")
        .with_file("/b.css", ".b { composes: c from \"./c.css\" }")
        .with_file("/c.css", ".c { color: red }");
    loader.load("/a.css").unwrap();
    loader.load("/b.css").unwrap();
    let css = loader.final_source();
    assert_eq!(css.matches("._c__c").count(), 1);
    assert!(css.find("._c__c") < css.find("._a__a"));
    assert!(css.find("._a__a") < css.find("._b__b"));
}

#[test]
fn test_memory_loader_cycle() {
    let mut loader = MemoryLoader::new(Processor::default())
        .with_file("/a.css", ".a { composes: b from \"./b.css\" }")
        .with_file("/b.css", ".b { composes: a from \"./a.css\" }");
    let err = loader.load("/a.css").unwrap_err();
    assert_eq!(err.code, ErrorCode::E3002);
    assert_eq!(err.message, "circular import of \"/a.css\"");
    assert_eq!(err.file.as_deref(), Some("/b.css"));
}

#[test]
fn test_memory_loader_missing_file() {
    let mut loader = MemoryLoader::new(Processor::default());
    let err = loader.load("/nope.css").unwrap_err();
    assert_eq!(err.code, ErrorCode::E3002);
    assert!(loader.final_source().is_empty());
}
