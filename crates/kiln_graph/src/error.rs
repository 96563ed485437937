//! Error types for a build call.

use std::path::PathBuf;

use kiln_diagnostics::Diagnostic;

/// A failed build call.
///
/// Whatever the variant, the caller's [`DependentGraph`](crate::DependentGraph)
/// is exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The compiler reported one or more diagnostics.
    #[error("compilation failed with {} diagnostic(s)", .diagnostics.len())]
    Compile {
        /// Everything the compiler reported, in transcript order.
        diagnostics: Vec<Diagnostic>,
    },

    /// A harvested artifact could not be mapped back to a source unit.
    #[error(transparent)]
    Translation(#[from] NamingError),

    /// The compiler or analyzer could not be run.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A filesystem operation performed by the engine itself failed.
    #[error("build I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A key that falls outside the tree the naming contract covers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    /// The key does not live under the expected root directory.
    #[error("{key} is not under {}", .root.display())]
    OutsideRoot {
        /// The offending artifact or unit key.
        key: String,
        /// The root it was expected under.
        root: PathBuf,
    },

    /// The key lives under the root but has the wrong suffix.
    #[error("{key} does not have the .{expected} suffix")]
    UnexpectedSuffix {
        /// The offending artifact or unit key.
        key: String,
        /// The suffix that was expected.
        expected: String,
    },
}

/// Failure to run an external collaborator (compiler or analyzer).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The process could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        /// The program that was being launched.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The process ran but reported failure in a way that carries no diagnostics.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        /// The program that failed.
        program: String,
        /// The exit status, as displayed by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_counts_diagnostics() {
        let err = BuildError::Compile {
            diagnostics: vec![Diagnostic::error("a"), Diagnostic::error("b")],
        };
        assert_eq!(err.to_string(), "compilation failed with 2 diagnostic(s)");
    }

    #[test]
    fn naming_error_display() {
        let err = NamingError::OutsideRoot {
            key: "/tmp/X.class".to_string(),
            root: PathBuf::from("build"),
        };
        assert_eq!(err.to_string(), "/tmp/X.class is not under build");

        let err = NamingError::UnexpectedSuffix {
            key: "build/X.txt".to_string(),
            expected: "class".to_string(),
        };
        assert_eq!(err.to_string(), "build/X.txt does not have the .class suffix");
    }

    #[test]
    fn translation_is_transparent() {
        let err: BuildError = NamingError::UnexpectedSuffix {
            key: "k".to_string(),
            expected: "class".to_string(),
        }
        .into();
        assert!(matches!(err, BuildError::Translation(_)));
        assert_eq!(err.to_string(), "k does not have the .class suffix");
    }

    #[test]
    fn launch_error_display() {
        let err = ToolError::Launch {
            program: "javac".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("failed to launch javac"));
    }
}
