//! Configuration file support for modbridge.
//!
//! modbridge supports two configuration file locations:
//! - Global: `~/.modbridge/config.toml` - User-wide defaults
//! - Project: `.modbridge/config.toml` - Instance-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::{DEFAULT_DESCRIPTOR, DEFAULT_VERSION_KEY};
use crate::resolver::classify::ModuleLayout;
use crate::resolver::resolve::DEFAULT_EXTENSION;
use crate::shim::binding::DEFAULT_SHIM_MARKER;

/// Directory scanned for the module when nothing else is configured.
pub const DEFAULT_MODS_DIR: &str = "mods";

/// modbridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module discovery settings
    pub module: ModuleConfig,

    /// Host platform settings
    pub platform: PlatformConfig,

    /// Shim binding settings
    pub shim: ShimConfig,
}

/// Where and how to look for the module artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Directory scanned for the module (default: `mods`)
    pub mods_dir: Option<PathBuf>,

    /// Archive extension, matched case-sensitively (default: `jar`)
    pub extension: Option<String>,

    /// Entry holding the version constants
    pub marker_entry: Option<String>,

    /// Field carrying the module version
    pub version_field: Option<String>,

    /// Field carrying the platform version the module was built for
    pub platform_field: Option<String>,

    /// Entry prefix marking the installer variant
    pub installer_prefix: Option<String>,
}

/// Host platform version descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Path of the JSON version descriptor (default: `version.json`)
    pub descriptor: Option<PathBuf>,

    /// Key of the version in the descriptor (default: `id`)
    pub version_key: Option<String>,
}

/// Shim binding configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Prefix marking stub names (default: `shim_`)
    pub marker: Option<String>,

    /// Patch declaration file
    pub patches: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Module settings
        if other.module.mods_dir.is_some() {
            self.module.mods_dir = other.module.mods_dir;
        }
        if other.module.extension.is_some() {
            self.module.extension = other.module.extension;
        }
        if other.module.marker_entry.is_some() {
            self.module.marker_entry = other.module.marker_entry;
        }
        if other.module.version_field.is_some() {
            self.module.version_field = other.module.version_field;
        }
        if other.module.platform_field.is_some() {
            self.module.platform_field = other.module.platform_field;
        }
        if other.module.installer_prefix.is_some() {
            self.module.installer_prefix = other.module.installer_prefix;
        }

        // Platform settings
        if other.platform.descriptor.is_some() {
            self.platform.descriptor = other.platform.descriptor;
        }
        if other.platform.version_key.is_some() {
            self.platform.version_key = other.platform.version_key;
        }

        // Shim settings
        if other.shim.marker.is_some() {
            self.shim.marker = other.shim.marker;
        }
        if other.shim.patches.is_some() {
            self.shim.patches = other.shim.patches;
        }
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.module
            .mods_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODS_DIR))
    }

    pub fn extension(&self) -> &str {
        self.module.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// Archive layout, with unset fields taking their defaults.
    pub fn layout(&self) -> ModuleLayout {
        let defaults = ModuleLayout::default();
        ModuleLayout {
            marker_entry: self
                .module
                .marker_entry
                .clone()
                .unwrap_or(defaults.marker_entry),
            version_field: self
                .module
                .version_field
                .clone()
                .unwrap_or(defaults.version_field),
            platform_field: self
                .module
                .platform_field
                .clone()
                .unwrap_or(defaults.platform_field),
            installer_prefix: self
                .module
                .installer_prefix
                .clone()
                .unwrap_or(defaults.installer_prefix),
        }
    }

    pub fn descriptor(&self) -> PathBuf {
        self.platform
            .descriptor
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR))
    }

    pub fn version_key(&self) -> &str {
        self.platform
            .version_key
            .as_deref()
            .unwrap_or(DEFAULT_VERSION_KEY)
    }

    pub fn shim_marker(&self) -> &str {
        self.shim.marker.as_deref().unwrap_or(DEFAULT_SHIM_MARKER)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.modbridge/config.toml)
/// 2. Global config (~/.modbridge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global modbridge config directory (~/.modbridge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".modbridge"))
}

/// Get the global config path (~/.modbridge/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.modbridge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".modbridge").join("config.toml")
}

/// Load the configuration that applies in `project_root`.
pub fn load_for(project_root: &Path) -> Config {
    let project = project_config_path(project_root);
    match global_config_path() {
        Some(global) => load_config(&global, &project),
        None => load_config(Path::new(""), &project),
    }
}
