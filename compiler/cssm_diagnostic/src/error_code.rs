use std::fmt;

/// Error codes for all diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Tokenizer errors
/// - E1xxx: Selector and stylesheet syntax errors
/// - E2xxx: Scope transform errors
/// - E3xxx: Import resolution errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Tokenizer Errors (E0xxx)
    /// Unclosed string or comment
    E0001,
    /// Escape sequence that cannot appear in an identifier
    E0002,

    // Syntax Errors (E1xxx)
    /// Unexpected character or token
    E1001,
    /// Missing opening or closing parenthesis
    E1002,
    /// Missing opening or closing square bracket
    E1003,
    /// Missing whitespace around a bare `:local`/`:global`
    E1004,

    // Scope Errors (E2xxx)
    /// Selectors of one rule disagree on global/local mode
    E2001,
    /// `:local` nested in `:global(...)` or the reverse
    E2002,
    /// `:local()` or `:global()` with no argument
    E2003,
    /// Selector without a local class or id in pure mode
    E2004,
    /// `composes` references an unknown class
    E2005,
    /// `composes` on a selector that is not a single local class
    E2006,
    /// Something other than a class, id or `[class=...]` inside `:local(...)`
    E2007,

    // Import Errors (E3xxx)
    /// Composition imports have no consistent order
    E3001,
    /// Loader could not provide an imported module
    E3002,
}

impl ErrorCode {
    /// Check if this is a syntax error (E0xxx or E1xxx range).
    pub fn is_syntax_error(&self) -> bool {
        let code = self.as_str();
        code.starts_with("E0") || code.starts_with("E1")
    }

    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
        }
    }

    /// Descriptive name of the error kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "UnclosedToken",
            ErrorCode::E0002 => "InvalidIdentifierEscape",
            ErrorCode::E1001 => "UnexpectedCharacter",
            ErrorCode::E1002 => "MissingParenthesis",
            ErrorCode::E1003 => "MissingSquareBracket",
            ErrorCode::E1004 => "MissingWhitespace",
            ErrorCode::E2001 => "InconsistentRuleMode",
            ErrorCode::E2002 => "NestedScopeConflict",
            ErrorCode::E2003 => "EmptyScopedPseudo",
            ErrorCode::E2004 => "ImpureSelector",
            ErrorCode::E2005 => "UnknownComposition",
            ErrorCode::E2006 => "InvalidComposition",
            ErrorCode::E2007 => "InvalidLocalContent",
            ErrorCode::E3001 => "NondeterministicImportOrder",
            ErrorCode::E3002 => "ImportFailed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
