//! Structured diagnostic messages lifted from a compiler transcript.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a source file as reported by the compiler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// The file the compiler named, verbatim.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, when the compiler reports one.
    pub column: Option<u32>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}:{}", self.file, self.line, col),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// A single compiler diagnostic.
///
/// The orchestrator does not interpret the message; it only needs to know
/// that the compiler complained. Locations and notes are kept so the CLI can
/// show the user something useful.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The main diagnostic message.
    pub message: String,
    /// Where the compiler says the problem is, if anywhere.
    pub location: Option<Location>,
    /// Continuation lines the compiler printed under the message.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with no location.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Creates an error diagnostic with no location.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a warning diagnostic with no location.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Attaches a source location.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_error() {
        let diag = Diagnostic::error("cannot find symbol");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "cannot find symbol");
        assert!(diag.location.is_none());
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::warning("unchecked call")
            .at(Location {
                file: "src/A.java".to_string(),
                line: 4,
                column: Some(9),
            })
            .with_note("recompile with -Xlint:unchecked for details");
        assert_eq!(diag.location.as_ref().unwrap().to_string(), "src/A.java:4:9");
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn location_without_column() {
        let loc = Location {
            file: "B.java".to_string(),
            line: 12,
            column: None,
        };
        assert_eq!(loc.to_string(), "B.java:12");
    }

    #[test]
    fn serializes_severity_lowercase() {
        let json = serde_json::to_string(&Diagnostic::error("x")).unwrap();
        assert!(json.contains(r#""severity":"error""#));
    }
}
