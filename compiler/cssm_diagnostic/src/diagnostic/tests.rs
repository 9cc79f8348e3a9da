use super::*;
use pretty_assertions::assert_eq;

#[test]
fn display_includes_code_and_message() {
    let diag = Diagnostic::unexpected("Unexpected \"|\".", 3);
    assert_eq!(diag.to_string(), "error[E1001]: Unexpected \"|\".");
}

#[test]
fn render_resolves_line_and_column() {
    let source = ".a {}\n.b:local.c {}";
    let diag = Diagnostic::new(ErrorCode::E1004, "Missing whitespace after :local", 14)
        .with_file("button.css");
    assert_eq!(
        diag.render(source),
        "button.css:2:9: error[E1004]: Missing whitespace after :local"
    );
}

#[test]
fn render_lists_notes() {
    let diag = Diagnostic::new(ErrorCode::E3001, "Failed to resolve order", 0)
        .with_note("a.css")
        .with_note("b.css");
    assert_eq!(
        diag.render(""),
        "1:1: error[E3001]: Failed to resolve order\n  note: a.css\n  note: b.css"
    );
}

#[test]
fn offset_by_shifts_into_enclosing_source() {
    let diag = Diagnostic::invalid_escape(2).offset_by(10);
    assert_eq!(diag.offset, 12);
    assert_eq!(diag.code, ErrorCode::E0002);
}
