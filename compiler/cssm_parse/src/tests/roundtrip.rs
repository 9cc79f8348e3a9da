//! Lossless printing.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{parse, parse_with, ParseOptions};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[track_caller]
fn roundtrip(source: &str) {
    let tree = parse(source).unwrap();
    assert_eq!(tree.to_string(), source);
}

#[track_caller]
fn roundtrip_safe(source: &str) {
    let tree = parse_with(source, ParseOptions::default().with_safe(true)).unwrap();
    assert_eq!(tree.to_string(), source);
}

fn lossy(source: &str) -> String {
    parse_with(source, ParseOptions::default().with_lossy(true))
        .unwrap()
        .to_string()
}

#[test]
fn simple_selectors() {
    for source in ["a", ".a", "#a", "*", "&", "a.b#c", ":hover", "::before", "a:not(.b)"] {
        roundtrip(source);
    }
}

#[test]
fn combinators_and_whitespace() {
    for source in [
        "a b",
        "a  b",
        "a\n\tb",
        "a\n b",
        "a>b",
        "a > b",
        "a   >   b",
        "a+b ~ c",
        "a || b",
        "a /deep/ b",
        " a ",
        "a , b",
        "a,\n  b",
    ] {
        roundtrip(source);
    }
}

#[test]
fn leading_combinators_keep_whitespace() {
    for source in [
        ">a",
        " > a",
        "\n~\\ ",
        "  + a, > b",
        ":has(> img)",
        ":has( > img)",
        ":has(\n> a)",
        ":has( /deep/ a)",
        "a:not( > b, ~ c)",
        " /*c*/ > a",
    ] {
        roundtrip(source);
    }
}

#[test]
fn safe_mode_closes_brackets_at_end() {
    for source in [
        "[a",
        "[a=b",
        "[a=\"b\" i",
        "a[ b ",
        ":not(.a",
        ":not(",
        ":not( .a ",
        ":is(.a, [b",
        "a:not(:has(.b",
        "a(b",
    ] {
        roundtrip_safe(source);
    }
}

#[test]
fn comments_are_kept() {
    for source in [
        "/*c*/a",
        "a/*c*/b",
        "a /*c*/ b",
        "a /*c*/b",
        "a/*c*/ > b",
        "a /*c*/, b",
        ":not( /*c*/ a )",
    ] {
        roundtrip(source);
    }
}

#[test]
fn escapes_and_strings() {
    for source in [".a\\:b", "#\\31 23", ".\\@media", "a\\.b", "\"str\"", "a'x'"] {
        roundtrip(source);
    }
}

#[test]
fn attributes() {
    for source in [
        "[a]",
        "[ a ]",
        "[a=b]",
        "[a = b]",
        "[a=\"b\"]",
        "[a='b' i]",
        "[a=\"b\"i]",
        "[a=b i]",
        "[a=\"b\" s]",
        "[a|=b]",
        "[a~=b]",
        "[a^=b]",
        "[a$=b]",
        "[a*=b]",
        "[ns|a]",
        "[|a]",
        "[*|a]",
        "[a=b/*c*/]",
        "[a/*c*/=b]",
    ] {
        roundtrip(source);
    }
}

#[test]
fn nested_pseudo_arguments() {
    for source in [
        ":not(a, b)",
        ":is(:not(.a), .b)",
        ":nth-child(2n+1)",
        "a:not( .b , .c )",
        ":not()",
        ":not( )",
    ] {
        roundtrip(source);
    }
}

#[test]
fn namespaces_and_trailing_comma() {
    for source in ["ns|a", "*|a", "|a", "*|*", "a,", "a, b,"] {
        roundtrip(source);
    }
}

#[test]
fn lossy_collapses_whitespace() {
    assert_eq!(lossy("a   >   b"), "a>b");
    assert_eq!(lossy("a \n  b"), "a b");
    assert_eq!(lossy(" .a , .b "), ".a,.b");
    assert_eq!(lossy("[ a = b ]"), "[a=b]");
    assert_eq!(lossy("a:not( .b )"), "a:not(.b)");
}

fn compound() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a", "div", ".b", "#c", "[d]", "[e=\"f\"]", "[g|=h i]", ":hover", "::before", "*",
            ":not(.x)", "\\.y",
        ]),
        1..4,
    )
    .prop_map(|parts| parts.concat())
}

fn complex() -> impl Strategy<Value = String> {
    (
        compound(),
        prop::collection::vec(
            (
                prop::sample::select(vec![
                    " ", "  ", "\n", " > ", "+", " ~ ", ">", " /*c*/ ", "\n> ", " +", "\t~\n",
                ]),
                compound(),
            ),
            0..4,
        ),
    )
        .prop_map(|(head, rest)| {
            let mut out = head;
            for (combinator, part) in rest {
                out.push_str(combinator);
                out.push_str(&part);
            }
            out
        })
}

/// A selector that may open with whitespace and a combinator, as in
/// relative selectors inside `:has(...)`.
fn relative() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["", " ", "\n", "  "]),
        prop::sample::select(vec!["", ">", "~", "+", "> ", "~ ", "+\n"]),
        complex(),
    )
        .prop_map(|(space, combinator, rest)| format!("{space}{combinator}{rest}"))
}

proptest! {
    #[test]
    fn relative_selectors_roundtrip(
        selectors in prop::collection::vec(relative(), 1..3),
        escape in prop::sample::select(vec!["", ".\\:b", ".a\\ b", "#\\31 a"]),
    ) {
        let source = format!(":has({}){escape}", selectors.join(", "));
        let tree = parse(&source).unwrap();
        prop_assert_eq!(tree.to_string(), source);
    }

    #[test]
    fn selector_lists_roundtrip(
        selectors in prop::collection::vec(complex(), 1..4),
        separator in prop::sample::select(vec![",", ", ", " , ", ",\n"]),
    ) {
        let source = selectors.join(separator);
        let tree = parse(&source).unwrap();
        prop_assert_eq!(tree.to_string(), source);
    }
}
