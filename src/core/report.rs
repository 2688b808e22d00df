//! Process-wide sink for the most recent terminal failure.
//!
//! The host's user-facing error screen reads whatever was reported last.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

static LAST_ERROR: Mutex<Option<ErrorReport>> = Mutex::new(None);

/// A reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Formatted message for the user
    pub message: String,
    /// Underlying cause, for diagnostics
    pub cause: Option<String>,
    /// Defect in the bridge rather than in the user's setup
    pub internal: bool,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, "\n\ncaused by: {}", cause)?;
        }
        Ok(())
    }
}

/// Record a terminal failure, replacing any earlier one.
pub fn set_error(message: impl Into<String>, cause: Option<String>, internal: bool) {
    let report = ErrorReport {
        message: message.into(),
        cause,
        internal,
    };
    tracing::debug!("reporting error: {}", report.message);
    *LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner()) = Some(report);
}

/// The most recent failure, if any.
pub fn last_error() -> Option<ErrorReport> {
    LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Remove and return the most recent failure.
pub fn take_error() -> Option<ErrorReport> {
    LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner()).take()
}
