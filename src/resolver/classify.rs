//! Classification of a single candidate file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::archive::{ArchiveError, ArchiveInspector};
use crate::core::outcome::{ArtifactOutcome, ModuleVariant, VersionMetadata};
use crate::core::platform::{PlatformVersion, VersionDescriptorReader};
use crate::resolver::errors::ResolveError;

/// Marker class that identifies the module.
pub const DEFAULT_MARKER_ENTRY: &str = "net/optifine/Config.class";

/// Field in the marker class holding the module's own version.
pub const DEFAULT_VERSION_FIELD: &str = "VERSION";

/// Field in the marker class holding the targeted platform version.
pub const DEFAULT_PLATFORM_FIELD: &str = "MC_VERSION";

/// Entries under this prefix mark the installer variant.
pub const DEFAULT_INSTALLER_PREFIX: &str = "patch/";

/// Where the classifier looks inside a candidate archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    pub marker_entry: String,
    pub version_field: String,
    pub platform_field: String,
    pub installer_prefix: String,
}

impl Default for ModuleLayout {
    fn default() -> Self {
        ModuleLayout {
            marker_entry: DEFAULT_MARKER_ENTRY.to_string(),
            version_field: DEFAULT_VERSION_FIELD.to_string(),
            platform_field: DEFAULT_PLATFORM_FIELD.to_string(),
            installer_prefix: DEFAULT_INSTALLER_PREFIX.to_string(),
        }
    }
}

/// Result of classifying one file.
#[derive(Debug)]
pub enum Classification {
    /// The file is a usable copy of the module.
    Compatible {
        variant: ModuleVariant,
        metadata: VersionMetadata,
    },
    /// Not our artifact.
    Unrelated,
    /// Our artifact, but unusable.
    Rejected(ResolveError),
}

impl Classification {
    pub fn outcome(&self) -> ArtifactOutcome {
        match self {
            Classification::Compatible { variant, .. } => variant.outcome(),
            Classification::Unrelated => ArtifactOutcome::Unrelated,
            Classification::Rejected(err) => err.outcome(),
        }
    }

    pub fn metadata(&self) -> Option<&VersionMetadata> {
        match self {
            Classification::Compatible { metadata, .. } => Some(metadata),
            _ => None,
        }
    }
}

/// Classifies candidate files against the running platform.
///
/// The platform version is read from the descriptor the first time it is
/// needed and reused for every later candidate.
pub struct ArtifactClassifier {
    layout: ModuleLayout,
    descriptor: VersionDescriptorReader,
    platform: OnceLock<PlatformVersion>,
}

impl ArtifactClassifier {
    pub fn new(descriptor: VersionDescriptorReader) -> Self {
        ArtifactClassifier {
            layout: ModuleLayout::default(),
            descriptor,
            platform: OnceLock::new(),
        }
    }

    pub fn with_layout(mut self, layout: ModuleLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &ModuleLayout {
        &self.layout
    }

    fn platform_version(&self) -> Result<&PlatformVersion, ResolveError> {
        if let Some(version) = self.platform.get() {
            return Ok(version);
        }

        let version = self.descriptor.read().map_err(|e| {
            ResolveError::internal(
                "failed to find the current platform version, please report this",
                e,
            )
        })?;
        tracing::debug!("running platform version {}", version);
        Ok(self.platform.get_or_init(|| version))
    }

    /// Classify one candidate file.
    pub fn classify(&self, file: &Path) -> Classification {
        match self.try_classify(file) {
            Ok(Some((variant, metadata))) => Classification::Compatible { variant, metadata },
            Ok(None) => Classification::Unrelated,
            Err(err) => Classification::Rejected(err),
        }
    }

    fn try_classify(
        &self,
        file: &Path,
    ) -> Result<Option<(ModuleVariant, VersionMetadata)>, ResolveError> {
        let mut archive = ArchiveInspector::open(file).map_err(|e| archive_error(file, e))?;

        let Some(table) = archive
            .read_record_table(&self.layout.marker_entry)
            .map_err(|e| archive_error(file, e))?
        else {
            tracing::debug!("{} has no marker entry, skipping", file.display());
            return Ok(None);
        };

        let module_version = table.string_constant(&self.layout.version_field);
        let target_version = table.string_constant(&self.layout.platform_field);
        let (Some(module_version), Some(target_version)) = (module_version, target_version) else {
            return Err(ResolveError::MissingVersionInfo {
                path: file.to_path_buf(),
            });
        };
        if module_version.is_empty() || target_version.is_empty() {
            return Err(ResolveError::MissingVersionInfo {
                path: file.to_path_buf(),
            });
        }

        let running = self.platform_version()?;
        if running.as_str() != target_version {
            return Err(ResolveError::IncompatibleVersion {
                path: file.to_path_buf(),
                required: target_version.to_string(),
                running: running.to_string(),
            });
        }

        let variant = if archive.has_entry_with_prefix(&self.layout.installer_prefix) {
            ModuleVariant::Installer
        } else {
            ModuleVariant::Module
        };

        Ok(Some((
            variant,
            VersionMetadata {
                module_version: module_version.to_string(),
                target_platform_version: target_version.to_string(),
            },
        )))
    }
}

fn archive_error(file: &Path, err: ArchiveError) -> ResolveError {
    match err {
        ArchiveError::Corrupt { reason, .. } => ResolveError::CorruptArchive {
            path: file.to_path_buf(),
            reason,
        },
        ArchiveError::Io { path, source } => ResolveError::internal(
            format!("failed to read {}", path.display()),
            source,
        ),
    }
}

/// Classify a file that was handed over directly rather than found by a scan.
pub fn classify_file(
    file: impl Into<PathBuf>,
    descriptor: VersionDescriptorReader,
) -> Classification {
    ArtifactClassifier::new(descriptor).classify(&file.into())
}
