//! The process-wide handle to the accepted module.
//!
//! Written once, when resolution succeeds, and read-only afterwards. Weaving
//! runs strictly after resolution, so readers never race the writer.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use crate::core::class_table::{ArchiveClassTable, ClassTable};
use crate::core::outcome::{ModuleVariant, VersionMetadata};
use crate::resolver::ResolvedModule;

static MODULE: OnceLock<ModuleHandle> = OnceLock::new();

/// Error installing the module handle.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error(
        "module already resolved to {} ({}), refusing to switch to {} ({})",
        existing.display(), existing_version, requested.display(), requested_version
    )]
    AlreadyInstalled {
        existing: PathBuf,
        existing_version: String,
        requested: PathBuf,
        requested_version: String,
    },
}

/// The accepted module: where it lives, what it is and its classes.
#[derive(Debug)]
pub struct ModuleHandle {
    module: ResolvedModule,
    fingerprint: String,
    classes: ArchiveClassTable,
}

impl ModuleHandle {
    pub fn new(module: ResolvedModule, fingerprint: impl Into<String>) -> Self {
        let classes = ArchiveClassTable::new(&module.path);
        ModuleHandle {
            module,
            fingerprint: fingerprint.into(),
            classes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.module.path
    }

    pub fn variant(&self) -> ModuleVariant {
        self.module.variant
    }

    pub fn metadata(&self) -> &VersionMetadata {
        &self.module.metadata
    }

    /// SHA-256 of the archive at resolution time.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn resolved(&self) -> &ResolvedModule {
        &self.module
    }

    /// The module's classes, for shim binding.
    pub fn classes(&self) -> &dyn ClassTable {
        &self.classes
    }

    fn same_artifact(&self, other: &ModuleHandle) -> bool {
        self.module == other.module && self.fingerprint == other.fingerprint
    }
}

/// Install the process-wide module handle.
///
/// Installing the same artifact again returns the existing handle; a
/// different artifact is refused.
pub fn install(handle: ModuleHandle) -> Result<&'static ModuleHandle, ModuleError> {
    let rejected = MODULE.set(handle).err();
    let installed = get();

    match rejected {
        Some(rejected) if !installed.same_artifact(&rejected) => {
            Err(ModuleError::AlreadyInstalled {
                existing: installed.path().to_path_buf(),
                existing_version: installed.metadata().module_version.clone(),
                requested: rejected.path().to_path_buf(),
                requested_version: rejected.metadata().module_version.clone(),
            })
        }
        _ => Ok(installed),
    }
}

/// The installed module handle, if resolution already succeeded.
pub fn try_get() -> Option<&'static ModuleHandle> {
    MODULE.get()
}

/// The installed module handle.
///
/// # Panics
///
/// Panics if called before the module was resolved. Weaving depends on
/// resolution having happened first, so this is a programming error.
pub fn get() -> &'static ModuleHandle {
    match MODULE.get() {
        Some(handle) => handle,
        None => panic!("module handle read before the module was resolved"),
    }
}
