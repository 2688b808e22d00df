//! Resolution of the single module artifact in a directory.
//!
//! Resolution is a reduction over the directory's candidates in file-name
//! order. The scan either ends holding exactly one compatible artifact, or it
//! fails on the first fatal classification. A corrupt or incompatible file
//! blocks acceptance of a later valid one, since it is then unclear which copy
//! the user meant to install.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::outcome::{ArtifactOutcome, ModuleVariant, VersionMetadata};
use crate::resolver::classify::{ArtifactClassifier, Classification};
use crate::resolver::errors::ResolveError;
use crate::util::fs::candidate_files;

/// Default archive extension of the module.
pub const DEFAULT_EXTENSION: &str = "jar";

/// The accepted module artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModule {
    pub path: PathBuf,
    pub variant: ModuleVariant,
    pub metadata: VersionMetadata,
}

impl ResolvedModule {
    pub fn outcome(&self) -> ArtifactOutcome {
        self.variant.outcome()
    }
}

enum ScanState {
    NoCandidate,
    OneCandidate(ResolvedModule),
}

/// Scans a directory for the module.
pub struct ArtifactResolver {
    classifier: ArtifactClassifier,
    extension: String,
}

impl ArtifactResolver {
    pub fn new(classifier: ArtifactClassifier) -> Self {
        ArtifactResolver {
            classifier,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn classifier(&self) -> &ArtifactClassifier {
        &self.classifier
    }

    /// Resolve the module in `directory`.
    pub fn resolve(&self, directory: &Path) -> Result<ResolvedModule, ResolveError> {
        let mut state = ScanState::NoCandidate;

        for file in candidate_files(directory, &self.extension) {
            let classification = self.classifier.classify(&file);
            tracing::debug!("{}: {}", file.display(), classification.outcome());

            state = match (state, classification) {
                (state, Classification::Unrelated) => state,
                (_, Classification::Rejected(err)) => {
                    tracing::warn!("{}", err);
                    return Err(err);
                }
                (ScanState::OneCandidate(first), Classification::Compatible { .. }) => {
                    let err = ResolveError::Duplicate {
                        first: first.path,
                        second: file,
                    };
                    tracing::warn!("{}", err);
                    return Err(err);
                }
                (ScanState::NoCandidate, Classification::Compatible { variant, metadata }) => {
                    ScanState::OneCandidate(ResolvedModule {
                        path: file,
                        variant,
                        metadata,
                    })
                }
            };
        }

        match state {
            ScanState::OneCandidate(module) => {
                tracing::info!(
                    "found module {} for {} ({}) at {}",
                    module.metadata.module_version,
                    module.metadata.target_platform_version,
                    module.variant,
                    module.path.display()
                );
                Ok(module)
            }
            ScanState::NoCandidate => Err(ResolveError::Missing {
                directory: directory.to_path_buf(),
            }),
        }
    }
}
