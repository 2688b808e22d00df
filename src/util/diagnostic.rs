//! User-friendly diagnostic messages.
//!
//! Every terminal failure is rendered with its root cause, the values
//! involved and a suggested fix.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion for failures that are defects rather than user errors.
    pub const REPORT_BUG: &str = "This is a bug in the bridge, please report it";

    /// Suggestion when the module cannot be found.
    pub const PLACE_MODULE: &str = "Place exactly one copy of the module jar in this folder";

    /// Suggestion when the module jar is damaged or stripped.
    pub const REDOWNLOAD: &str = "Re-download the module from its official source";

    /// Suggestion when the wrong mods folder may have been scanned.
    pub const CHECK_MODS_DIR: &str = "Pass `--mods-dir` or set `module.mods_dir` in .modbridge/config.toml";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Resolution or binding cannot go on
    Error,
    /// Something was skipped; the rest still works
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn paint(text: &str, ansi: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", ansi, text)
    } else {
        text.to_string()
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Values involved, one per line
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    /// File the diagnostic is about
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for the terminal. A single suggestion goes on the `help:`
    /// line; several are numbered below it.
    pub fn format(&self, color: bool) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {}",
            paint(self.severity.label(), self.severity.ansi(), color),
            self.message
        );
        if let Some(path) = &self.location {
            let _ = writeln!(out, "  --> {}", path.display());
        }
        for line in &self.context {
            let _ = writeln!(out, "  → {}", line);
        }

        let help = paint("help", "1;32", color);
        match self.suggestions.as_slice() {
            [] => {}
            [only] => {
                let _ = write!(out, "\n{}: {}\n", help, only);
            }
            many => {
                let _ = write!(out, "\n{}: try one of:\n", help);
                for (n, suggestion) in many.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}", n + 1, suggestion);
                }
            }
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
