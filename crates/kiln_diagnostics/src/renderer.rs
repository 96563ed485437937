//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a batch of diagnostics followed by a one-line summary.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diag in diags {
            out.push_str(&self.render(diag));
        }
        let errors = diags.iter().filter(|d| d.severity.is_error()).count();
        let others = diags.len() - errors;
        out.push_str(&format!(
            "{errors} error(s), {others} other diagnostic(s) reported by the compiler\n"
        ));
        out
    }
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// error: cannot find symbol
///   --> src/pkg/B.java:7:9
///    = note: symbol: method breakingMethod()
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_severity(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let code = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note | crate::Severity::Help => "36",
        };
        format!("\x1b[1;{code}m{}\x1b[0m", diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.paint_severity(diag), diag.message);
        if let Some(loc) = &diag.location {
            out.push_str(&format!("  --> {loc}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}
