//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::outcome::ArtifactOutcome;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Terminal failure while resolving the module artifact.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not find the module in {}", directory.display())]
    Missing { directory: PathBuf },

    #[error("found more than one copy of the module: {} and {}", first.display(), second.display())]
    Duplicate { first: PathBuf, second: PathBuf },

    #[error("unable to find the module version in {}", path.display())]
    MissingVersionInfo { path: PathBuf },

    #[error(
        "the module at {} is not compatible with the running platform (requires {required}, running {running})",
        path.display()
    )]
    IncompatibleVersion {
        path: PathBuf,
        required: String,
        running: String,
    },

    #[error("the archive at {} is corrupt", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ResolveError {
    /// Create an internal error with an underlying cause.
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        ResolveError::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The outcome this failure corresponds to.
    pub fn outcome(&self) -> ArtifactOutcome {
        match self {
            ResolveError::Missing { .. } => ArtifactOutcome::Missing,
            ResolveError::Duplicate { .. } => ArtifactOutcome::Duplicate,
            ResolveError::MissingVersionInfo { .. } | ResolveError::IncompatibleVersion { .. } => {
                ArtifactOutcome::IncompatibleVersion
            }
            ResolveError::CorruptArchive { .. } => ArtifactOutcome::CorruptArchive,
            ResolveError::Internal { .. } => ArtifactOutcome::InternalError,
        }
    }

    /// Underlying cause, rendered for diagnostic reporting.
    pub fn cause(&self) -> Option<String> {
        match self {
            ResolveError::Internal {
                source: Some(source),
                ..
            } => Some(format!("{:#}", source)),
            ResolveError::CorruptArchive { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Missing { directory } => {
                Diagnostic::error("could not find the module jar in the mods folder")
                    .with_location(directory)
                    .with_suggestion(suggestions::PLACE_MODULE)
                    .with_suggestion(suggestions::CHECK_MODS_DIR)
            }

            ResolveError::Duplicate { first, second } => {
                Diagnostic::error("please ensure you only have 1 copy of the module in the mods folder")
                    .with_context(format!("found: {}", first.display()))
                    .with_context(format!("       {}", second.display()))
                    .with_suggestion("Remove all but one of the listed jars")
            }

            ResolveError::MissingVersionInfo { path } => {
                Diagnostic::error("unable to find the module version in the module jar")
                    .with_location(path)
                    .with_suggestion(suggestions::REDOWNLOAD)
            }

            ResolveError::IncompatibleVersion {
                path,
                required,
                running,
            } => Diagnostic::error(
                "this version of the module is not compatible with the current platform version",
            )
            .with_location(path)
            .with_context(format!("module requires {}", required))
            .with_context(format!("you are running {}", running))
            .with_suggestion(format!("Install the module build for {}", running)),

            ResolveError::CorruptArchive { path, reason } => {
                Diagnostic::error(format!("the jar at {} is corrupt", path.display()))
                    .with_context(reason.clone())
                    .with_suggestion("Delete the file and download it again")
            }

            ResolveError::Internal { message, source } => {
                let mut diag = Diagnostic::error(message.clone());
                if let Some(source) = source {
                    diag = diag.with_context(format!("caused by: {:#}", source));
                }
                diag.with_suggestion(suggestions::REPORT_BUG)
            }
        }
    }
}
