//! Inspection of a single candidate file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::{ArchiveInspector, RecordTable};
use crate::core::outcome::{ArtifactOutcome, VersionMetadata};
use crate::ops::resolve::ResolveOptions;
use crate::resolver::{Classification, ResolveError};
use crate::util::diagnostic::Diagnostic;
use crate::util::hash::sha256_file;

/// What a file turned out to be, with the evidence.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub outcome: ArtifactOutcome,
    pub metadata: Option<VersionMetadata>,
    /// Why the file was rejected
    pub detail: Option<String>,
    /// Decoded marker class, when the archive has a readable one
    pub marker: Option<RecordTable>,
    pub fingerprint: Option<String>,
    #[serde(skip)]
    pub error: Option<ResolveError>,
}

impl InspectReport {
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.error.as_ref().map(ResolveError::to_diagnostic)
    }
}

/// Classify `file` the way a directory scan would.
pub fn inspect_file(file: &Path, opts: &ResolveOptions) -> InspectReport {
    let classification = opts.classifier().classify(file);
    let outcome = classification.outcome();
    tracing::debug!("{}: {}", file.display(), outcome);

    let marker = read_marker(file, &opts.layout.marker_entry);
    let fingerprint = sha256_file(file).ok();

    let (metadata, error) = match classification {
        Classification::Compatible { metadata, .. } => (Some(metadata), None),
        Classification::Unrelated => (None, None),
        Classification::Rejected(err) => (None, Some(err)),
    };

    InspectReport {
        path: file.to_path_buf(),
        outcome,
        metadata,
        detail: error.as_ref().map(ToString::to_string),
        marker,
        fingerprint,
        error,
    }
}

fn read_marker(file: &Path, entry: &str) -> Option<RecordTable> {
    let mut archive = ArchiveInspector::open(file).ok()?;
    match archive.read_record_table(entry) {
        Ok(table) => table,
        Err(e) => {
            tracing::debug!("marker of {} unreadable: {}", file.display(), e);
            None
        }
    }
}
