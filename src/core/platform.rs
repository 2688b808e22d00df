//! The host platform's own version, read from its bundled descriptor.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Default descriptor resource name.
pub const DEFAULT_DESCRIPTOR: &str = "version.json";

/// Default key holding the platform version in the descriptor.
pub const DEFAULT_VERSION_KEY: &str = "id";

/// Version reported when the descriptor has no version key.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Error reading the platform descriptor. Always a packaging defect.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read platform descriptor {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("platform descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform descriptor is not a JSON object")]
    NotAnObject,

    #[error("platform descriptor field `{key}` is not a string")]
    NotAString { key: String },
}

/// The running platform's version identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformVersion(String);

impl PlatformVersion {
    pub fn new(version: impl Into<String>) -> Self {
        PlatformVersion(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the descriptor comes from.
#[derive(Debug, Clone)]
enum DescriptorSource {
    File(PathBuf),
    Inline(String),
}

/// Reads the platform version from a structured descriptor.
#[derive(Debug, Clone)]
pub struct VersionDescriptorReader {
    source: DescriptorSource,
    key: String,
}

impl VersionDescriptorReader {
    /// Read the descriptor from a file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        VersionDescriptorReader {
            source: DescriptorSource::File(path.into()),
            key: DEFAULT_VERSION_KEY.to_string(),
        }
    }

    /// Use descriptor contents already in memory.
    pub fn from_contents(contents: impl Into<String>) -> Self {
        VersionDescriptorReader {
            source: DescriptorSource::Inline(contents.into()),
            key: DEFAULT_VERSION_KEY.to_string(),
        }
    }

    /// Override the key holding the version.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            DescriptorSource::File(path) => Some(path),
            DescriptorSource::Inline(_) => None,
        }
    }

    /// Read and parse the descriptor.
    pub fn read(&self) -> Result<PlatformVersion, DescriptorError> {
        let contents = match &self.source {
            DescriptorSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
                    path: path.clone(),
                    source,
                })?
            }
            DescriptorSource::Inline(contents) => contents.clone(),
        };
        parse_descriptor(&contents, &self.key)
    }
}

/// Extract the platform version from descriptor text.
///
/// A missing key yields [`UNKNOWN_VERSION`], which never matches a module.
pub fn parse_descriptor(contents: &str, key: &str) -> Result<PlatformVersion, DescriptorError> {
    let value: Value = serde_json::from_str(contents)?;
    let object = value.as_object().ok_or(DescriptorError::NotAnObject)?;

    match object.get(key) {
        None => {
            tracing::warn!("platform descriptor has no `{}` field", key);
            Ok(PlatformVersion::new(UNKNOWN_VERSION))
        }
        Some(Value::String(version)) => Ok(PlatformVersion::new(version.clone())),
        Some(_) => Err(DescriptorError::NotAString {
            key: key.to_string(),
        }),
    }
}
