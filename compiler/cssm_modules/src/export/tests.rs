use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_insert_keeps_first_position() {
    let mut table = ExportTable::new();
    table.insert("b", "1");
    table.insert("a", "2");
    table.insert("b", "3");
    let entries: Vec<_> = table.iter().collect();
    assert_eq!(entries, vec![("b", "3"), ("a", "2")]);
    assert_eq!(table.get("b"), Some("3"));
    assert!(table.contains("a"));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_scoped_names_flatten() {
    let mut names = ScopedNames::new();
    names.push_unique("foo", "_a__foo");
    names.push_unique("foo", "_a__foo");
    names.push("foo", "bar");
    names.set("g", vec!["g".to_owned()]);
    assert_eq!(names.get("foo"), Some(&["_a__foo".to_owned(), "bar".to_owned()][..]));

    let table = names.to_table();
    assert_eq!(table.get("foo"), Some("_a__foo bar"));
    assert_eq!(table.get("g"), Some("g"));
}

#[cfg(feature = "serde")]
#[test]
fn test_serializes_as_ordered_map() {
    let table: ExportTable = [("z", "1"), ("a", "2")].into_iter().collect();
    let json = serde_json::to_string(&table).unwrap_or_default();
    assert_eq!(json, r#"{"z":"1","a":"2"}"#);
}
