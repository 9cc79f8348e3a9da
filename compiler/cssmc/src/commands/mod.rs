//! Command handlers for the cssm CLI.
//!
//! Shared helpers for reading input and reporting diagnostics live here.

use cssm_diagnostic::Diagnostic;

mod debug;
mod scope;

pub use debug::{parse_selector, show_unit, tokenize_selector, value_tree};
pub use scope::{scope_files, ScopeArgs};

/// Read a file to a string, exiting with an error message on failure.
fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                _ => format!("cannot read '{path}': {e}"),
            };
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

/// Print `diagnostic` against `source` and exit.
fn fail(diagnostic: &Diagnostic, source: &str) -> ! {
    eprintln!("{}", diagnostic.render(source));
    std::process::exit(1);
}
