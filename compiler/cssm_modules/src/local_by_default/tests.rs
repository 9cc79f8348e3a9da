#![allow(clippy::unwrap_used, clippy::expect_used)]

use cssm_diagnostic::{Diagnostic, ErrorCode};
use pretty_assertions::assert_eq;

use super::*;
use crate::sheet::parse_stylesheet;

fn run(source: &str, mode: ScopeMode) -> Result<String, Diagnostic> {
    let mut sheet = parse_stylesheet(source)?;
    local_by_default(&mut sheet, mode)?;
    Ok(sheet.to_css())
}

fn local(source: &str) -> String {
    run(source, ScopeMode::Local).unwrap()
}

fn error(source: &str, mode: ScopeMode) -> Diagnostic {
    run(source, mode).unwrap_err()
}

#[test]
fn test_wraps_classes_and_ids() {
    assert_eq!(local(".a .b {}"), ":local(.a) :local(.b) {}");
    assert_eq!(local("#a > div.b {}"), ":local(#a) > div:local(.b) {}");
    assert_eq!(local(".a, .b { color: red }"), ":local(.a), :local(.b) { color: red }");
}

#[test]
fn test_already_local_is_unchanged() {
    for source in [":local(.a) {}", ":local(.a) :local(#b) {}", ".x :local(.a) {}"] {
        let once = local(source);
        assert_eq!(local(&once), once);
    }
    assert_eq!(local(":local(.a) {}"), ":local(.a) {}");
}

#[test]
fn test_bare_global_switches_the_rest() {
    assert_eq!(local(".foo :global .bar {}"), ":local(.foo) .bar {}");
    assert_eq!(local(":global .a .b {}"), ".a .b {}");
}

#[test]
fn test_global_arguments_do_not_leak() {
    assert_eq!(local(":global(.a) .b {}"), ".a :local(.b) {}");
    assert_eq!(local(".a :global(.b) .c {}"), ":local(.a) .b :local(.c) {}");
}

#[test]
fn test_global_mode() {
    assert_eq!(run(".a .b {}", ScopeMode::Global).unwrap(), ".a .b {}");
    assert_eq!(
        run(".a :local .b {}", ScopeMode::Global).unwrap(),
        ".a :local(.b) {}"
    );
    assert_eq!(
        run(":local(.a) {}", ScopeMode::Global).unwrap(),
        ":local(.a) {}"
    );
}

#[test]
fn test_nested_in_other_pseudo() {
    assert_eq!(local(".a:not(.b) {}"), ":local(.a):not(:local(.b)) {}");
    assert_eq!(local("@media print { .a {} }"), "@media print { :local(.a) {} }");
}

#[test]
fn test_imported_names_stay() {
    assert_eq!(
        local(":import(\"x\") { foo: bar }\n.foo .baz {}"),
        ":import(\"x\") { foo: bar }\n.foo :local(.baz) {}"
    );
}

#[test]
fn test_missing_whitespace() {
    let err = error(".a:global .b {}", ScopeMode::Local);
    assert_eq!(err.code, ErrorCode::E1004);
    assert_eq!(err.message, "Missing whitespace before :global");

    let err = error(":global.a {}", ScopeMode::Local);
    assert_eq!(err.code, ErrorCode::E1004);
    assert_eq!(err.message, "Missing whitespace after :global");
}

#[test]
fn test_nested_scope_conflict() {
    let err = error(":global(:local(.a)) {}", ScopeMode::Local);
    assert_eq!(err.code, ErrorCode::E2002);
    assert_eq!(err.message, "A :local is not allowed inside of a :global(...)");

    let err = error(":local(.a :global .b) {}", ScopeMode::Local);
    assert_eq!(err.code, ErrorCode::E2002);
    assert_eq!(err.message, "A :global is not allowed inside of a :local(...)");
}

#[test]
fn test_inconsistent_rule_mode() {
    let err = error(".a, :global .b {}", ScopeMode::Local);
    assert_eq!(err.code, ErrorCode::E2001);
    assert!(err.message.starts_with("Inconsistent rule global/local result in rule \".a, :global .b\""));
}

#[test]
fn test_empty_scoped_pseudo() {
    let err = error(":local() {}", ScopeMode::Local);
    assert_eq!(err.code, ErrorCode::E2003);
    assert_eq!(err.message, ":local() can't be empty");
}

#[test]
fn test_error_offsets_are_sheet_relative() {
    let err = error(".x {}\n.a:global .b {}", ScopeMode::Local);
    assert!(err.offset >= 6);
}

#[test]
fn test_pure_mode() {
    assert_eq!(
        run(".a :global(.b) {}", ScopeMode::Pure).unwrap(),
        ":local(.a) .b {}"
    );

    let err = error(":global(.a) {}", ScopeMode::Pure);
    assert_eq!(err.code, ErrorCode::E2004);
    assert_eq!(
        err.message,
        "Selector \":global(.a)\" is not pure (pure selectors must contain at least one local class or id)"
    );

    let err = error(".a, div {}", ScopeMode::Pure);
    assert_eq!(err.code, ErrorCode::E2004);
}

#[test]
fn test_pure_ignore_comment() {
    assert_eq!(
        run("/* cssmodules-pure-ignore */\n:global(.a) {}", ScopeMode::Pure).unwrap(),
        "\n.a {}"
    );
    // The marker covers one rule only.
    let err = error(
        "/* cssmodules-pure-ignore */\n:global(.a) {}\n:global(.b) {}",
        ScopeMode::Pure,
    );
    assert_eq!(err.code, ErrorCode::E2004);
}

#[test]
fn test_pure_no_check_file() {
    let source = "/* cssmodules-pure-no-check */\n:global(.a) {}";
    assert_eq!(run(source, ScopeMode::Pure).unwrap(), "/* cssmodules-pure-no-check */\n.a {}");
}

#[test]
fn test_pure_icss_blocks() {
    let source = ":import(\"x\") { a: b }\n:export { c: d }";
    assert_eq!(run(source, ScopeMode::Pure).unwrap(), source);
}

#[test]
fn test_keyframes_names() {
    assert_eq!(local("@keyframes fade {}"), "@keyframes :local(fade) {}");
    assert_eq!(local("@-webkit-keyframes fade {}"), "@-webkit-keyframes :local(fade) {}");
    assert_eq!(local("@keyframes :global(fade) {}"), "@keyframes fade {}");
    assert_eq!(local("@keyframes :local(fade) {}"), "@keyframes :local(fade) {}");
    assert_eq!(
        run("@keyframes fade {}", ScopeMode::Global).unwrap(),
        "@keyframes fade {}"
    );
}

#[test]
fn test_keyframe_selectors_are_untouched() {
    assert_eq!(
        local("@keyframes fade { from { opacity: 0 } 50% { opacity: 1 } }"),
        "@keyframes :local(fade) { from { opacity: 0 } 50% { opacity: 1 } }"
    );
}

#[test]
fn test_pure_global_keyframes() {
    let err = error("@keyframes :global(fade) {}", ScopeMode::Pure);
    assert_eq!(err.code, ErrorCode::E2004);
    assert_eq!(
        run("/* cssmodules-pure-ignore */\n@keyframes :global(fade) {}", ScopeMode::Pure).unwrap(),
        "\n@keyframes fade {}"
    );
}

#[test]
fn test_animation_shorthand() {
    assert_eq!(
        local(".a { animation: fade 1s ease-in infinite; }"),
        ":local(.a) { animation: :local(fade) 1s ease-in infinite; }"
    );
    assert_eq!(
        local(".a { animation: a 1s, b 2s }"),
        ":local(.a) { animation: :local(a) 1s, :local(b) 2s }"
    );
    assert_eq!(local(".a { animation: none }"), ":local(.a) { animation: none }");
}

#[test]
fn test_animation_keyword_limits() {
    // A keyword past its limit is a name.
    assert_eq!(
        local(".a { animation: ease ease }"),
        ":local(.a) { animation: ease :local(ease) }"
    );
    assert_eq!(
        local(".a { -webkit-animation: infinite 1s }"),
        ":local(.a) { -webkit-animation: infinite 1s }"
    );
}

#[test]
fn test_animation_explicit_functions() {
    assert_eq!(
        local(".a { animation: global(fade) 1s, local(spin) 2s }"),
        ":local(.a) { animation: fade 1s, :local(spin) 2s }"
    );
}

#[test]
fn test_animation_name() {
    assert_eq!(
        local(".a { animation-name: a, var(--x), none }"),
        ":local(.a) { animation-name: :local(a), var(--x), none }"
    );
    assert_eq!(
        local(":global .a { animation-name: a }"),
        ".a { animation-name: a }"
    );
}

#[test]
fn test_animation_in_global_mode() {
    assert_eq!(
        run(".a { animation: fade 1s }", ScopeMode::Global).unwrap(),
        ".a { animation: fade 1s }"
    );
    assert_eq!(
        run(":local .a { animation: fade 1s }", ScopeMode::Global).unwrap(),
        ":local(.a) { animation: :local(fade) 1s }"
    );
}

#[test]
fn test_animation_skips_imported_alias() {
    assert_eq!(
        local(":import(\"x\") { spin: spin }\n.a { animation: spin 1s }"),
        ":import(\"x\") { spin: spin }\n:local(.a) { animation: spin 1s }"
    );
}
