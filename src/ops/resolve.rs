//! Module resolution operations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::module::{self, ModuleHandle};
use crate::core::outcome::ArtifactOutcome;
use crate::core::platform::VersionDescriptorReader;
use crate::core::report;
use crate::resolver::{ArtifactClassifier, ArtifactResolver, ModuleLayout, ResolveError, ResolvedModule};
use crate::util::config::Config;
use crate::util::hash::sha256_file;

/// Where to look for the module and what to check it against.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Directory scanned for the module
    pub mods_dir: PathBuf,

    /// Platform version descriptor
    pub descriptor: PathBuf,

    /// Key of the version in the descriptor
    pub version_key: String,

    /// Candidate archive extension
    pub extension: String,

    /// Where the version constants live inside the archive
    pub layout: ModuleLayout,
}

impl ResolveOptions {
    pub fn from_config(config: &Config) -> Self {
        ResolveOptions {
            mods_dir: config.mods_dir(),
            descriptor: config.descriptor(),
            version_key: config.version_key().to_string(),
            extension: config.extension().to_string(),
            layout: config.layout(),
        }
    }

    pub fn classifier(&self) -> ArtifactClassifier {
        ArtifactClassifier::new(
            VersionDescriptorReader::from_path(&self.descriptor).with_key(&self.version_key),
        )
        .with_layout(self.layout.clone())
    }

    pub fn resolver(&self) -> ArtifactResolver {
        ArtifactResolver::new(self.classifier()).with_extension(&self.extension)
    }
}

/// A successfully resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub outcome: ArtifactOutcome,
    #[serde(flatten)]
    pub module: ResolvedModule,
    /// SHA-256 of the archive
    pub fingerprint: String,
}

/// Resolve the module without touching process-wide state.
pub fn resolve_artifact(opts: &ResolveOptions) -> Result<ResolveReport, ResolveError> {
    tracing::debug!("scanning {} for the module", opts.mods_dir.display());
    let module = opts.resolver().resolve(&opts.mods_dir)?;
    let fingerprint = sha256_file(&module.path)
        .map_err(|e| ResolveError::internal("failed to fingerprint the module", e))?;

    tracing::info!(
        "found {} {} for {} at {}",
        module.variant,
        module.metadata.module_version,
        module.metadata.target_platform_version,
        module.path.display()
    );

    Ok(ResolveReport {
        outcome: module.outcome(),
        module,
        fingerprint,
    })
}

/// Resolve the module and install it as the process-wide module handle.
///
/// Failures are recorded in the last-error sink before being returned, so
/// the host can present them.
pub fn resolve_module(opts: &ResolveOptions) -> Result<&'static ModuleHandle> {
    let report = match resolve_artifact(opts) {
        Ok(report) => report,
        Err(err) => {
            report_resolve_error(&err);
            return Err(err.into());
        }
    };

    let handle = ModuleHandle::new(report.module, report.fingerprint);
    match module::install(handle) {
        Ok(handle) => Ok(handle),
        Err(err) => {
            report::set_error(err.to_string(), None, true);
            Err(err).context("failed to install the module handle")
        }
    }
}

/// Record a resolution failure in the last-error sink.
pub fn report_resolve_error(err: &ResolveError) {
    let internal = err.outcome() == ArtifactOutcome::InternalError;
    report::set_error(err.to_diagnostic().format(false), err.cause(), internal);
}
