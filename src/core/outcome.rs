//! Classification outcomes and the metadata extracted from a module.

use std::fmt;

use serde::Serialize;

/// Definitive relationship of a candidate file to the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactOutcome {
    Missing,
    CompatibleModule,
    CompatibleInstallerModule,
    IncompatibleVersion,
    CorruptArchive,
    Duplicate,
    InternalError,
    Unrelated,
}

impl ArtifactOutcome {
    /// Fatal outcomes terminate artifact resolution.
    pub fn is_fatal(self) -> bool {
        match self {
            ArtifactOutcome::Missing
            | ArtifactOutcome::IncompatibleVersion
            | ArtifactOutcome::CorruptArchive
            | ArtifactOutcome::Duplicate
            | ArtifactOutcome::InternalError => true,
            ArtifactOutcome::CompatibleModule
            | ArtifactOutcome::CompatibleInstallerModule
            | ArtifactOutcome::Unrelated => false,
        }
    }

    pub fn is_compatible(self) -> bool {
        matches!(
            self,
            ArtifactOutcome::CompatibleModule | ArtifactOutcome::CompatibleInstallerModule
        )
    }

    /// Whether the user can fix this by changing their setup.
    pub fn is_user_fixable(self) -> bool {
        self.is_fatal() && self != ArtifactOutcome::InternalError
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactOutcome::Missing => "missing",
            ArtifactOutcome::CompatibleModule => "compatible-module",
            ArtifactOutcome::CompatibleInstallerModule => "compatible-installer-module",
            ArtifactOutcome::IncompatibleVersion => "incompatible-version",
            ArtifactOutcome::CorruptArchive => "corrupt-archive",
            ArtifactOutcome::Duplicate => "duplicate",
            ArtifactOutcome::InternalError => "internal-error",
            ArtifactOutcome::Unrelated => "unrelated",
        }
    }
}

impl fmt::Display for ArtifactOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the module archive is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleVariant {
    /// Directly usable module
    Module,
    /// Installer that still has to produce the module (carries `patch/` entries)
    Installer,
}

impl ModuleVariant {
    pub fn outcome(self) -> ArtifactOutcome {
        match self {
            ModuleVariant::Module => ArtifactOutcome::CompatibleModule,
            ModuleVariant::Installer => ArtifactOutcome::CompatibleInstallerModule,
        }
    }
}

impl fmt::Display for ModuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleVariant::Module => write!(f, "module"),
            ModuleVariant::Installer => write!(f, "installer"),
        }
    }
}

/// Version information read from the module's marker class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionMetadata {
    /// The module's own version (`VERSION`)
    pub module_version: String,
    /// Platform version the module was built for (`MC_VERSION`)
    pub target_platform_version: String,
}
