use super::*;
use pretty_assertions::assert_eq;

fn split(value: &str) -> Option<(&str, &str)> {
    unit(value).map(|u| (u.number, u.unit))
}

#[test]
fn number_with_unit() {
    assert_eq!(split("12.5em"), Some(("12.5", "em")));
    assert_eq!(split("10px"), Some(("10", "px")));
    assert_eq!(split("100%"), Some(("100", "%")));
    assert_eq!(split("0"), Some(("0", "")));
}

#[test]
fn not_a_number() {
    assert_eq!(split("em"), None);
    assert_eq!(split(""), None);
    assert_eq!(split("-"), None);
    assert_eq!(split("."), None);
    assert_eq!(split("+.em"), None);
}

#[test]
fn signs_and_fractions() {
    assert_eq!(split("-2px"), Some(("-2", "px")));
    assert_eq!(split("+.5s"), Some(("+.5", "s")));
    assert_eq!(split(".5s"), Some((".5", "s")));
    assert_eq!(split("1.px"), Some(("1", ".px")));
}

#[test]
fn exponents() {
    assert_eq!(split("1e3"), Some(("1e3", "")));
    assert_eq!(split("1e-3px"), Some(("1e-3", "px")));
    assert_eq!(split("2E+2"), Some(("2E+2", "")));
    assert_eq!(split("1em"), Some(("1", "em")));
    assert_eq!(split("1e+x"), Some(("1", "e+x")));
}
