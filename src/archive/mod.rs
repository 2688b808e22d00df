//! Read-only inspection of module archives.
//!
//! An archive is opened, queried and dropped within a single operation; no
//! handle outlives the call that created it. Only the directory and the
//! specific entries asked for are read, and class entries are decoded
//! structurally by [`classfile`], so inspecting an archive never runs any of
//! its code.

pub mod classfile;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

pub use classfile::{DecodeError, FieldRecord, Literal, MethodRecord, RecordTable};

/// Largest entry, in bytes, that is ever read into memory. Class files never
/// come close to this.
pub const MAX_ENTRY_SIZE: u64 = 8 * 1024 * 1024;

/// Error while inspecting an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file could not be opened at all.
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The container or one of its entries is damaged.
    #[error("{} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl ArchiveError {
    fn corrupt(path: &Path, reason: impl ToString) -> Self {
        ArchiveError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, ArchiveError::Corrupt { .. })
    }
}

/// An open archive, scoped to one inspection.
pub struct ArchiveInspector {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl ArchiveInspector {
    /// Open an archive and read its central directory.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let zip = ZipArchive::new(BufReader::new(file)).map_err(|e| match e {
            ZipError::Io(source) if source.kind() != io::ErrorKind::UnexpectedEof => {
                ArchiveError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
            other => ArchiveError::corrupt(path, other),
        })?;

        Ok(ArchiveInspector {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an entry with exactly this name exists.
    pub fn contains(&self, entry: &str) -> bool {
        self.entry_names().any(|name| name == entry)
    }

    /// Read the raw bytes of an entry, or `None` if it does not exist.
    pub fn read_entry(&mut self, entry: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut file = match self.zip.by_name(entry) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ArchiveError::corrupt(&self.path, e)),
        };

        // The declared size comes from the archive and is not trusted.
        if file.size() > MAX_ENTRY_SIZE {
            return Err(ArchiveError::corrupt(
                &self.path,
                format!("entry `{}` declares {} bytes", entry, file.size()),
            ));
        }

        let mut bytes = Vec::new();
        (&mut file)
            .take(MAX_ENTRY_SIZE + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::corrupt(&self.path, format!("entry `{}`: {}", entry, e)))?;
        if bytes.len() as u64 > MAX_ENTRY_SIZE {
            return Err(ArchiveError::corrupt(
                &self.path,
                format!("entry `{}` is larger than {} bytes", entry, MAX_ENTRY_SIZE),
            ));
        }
        Ok(Some(bytes))
    }

    /// Locate a class entry and decode its record table.
    ///
    /// A class that is present but cannot be decoded makes the whole archive
    /// corrupt.
    pub fn read_record_table(&mut self, entry: &str) -> Result<Option<RecordTable>, ArchiveError> {
        let Some(bytes) = self.read_entry(entry)? else {
            return Ok(None);
        };

        classfile::decode(&bytes)
            .map(Some)
            .map_err(|e| ArchiveError::corrupt(&self.path, format!("entry `{}`: {}", entry, e)))
    }

    /// Whether any entry name begins with `prefix`. Only the directory is read.
    pub fn has_entry_with_prefix(&self, prefix: &str) -> bool {
        self.entry_names().any(|name| name.starts_with(prefix))
    }

    /// Iterate all entry names.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.zip.file_names()
    }
}

/// Open `file`, decode the class entry `entry` and close the archive again.
pub fn open_record_entry(file: &Path, entry: &str) -> Result<Option<RecordTable>, ArchiveError> {
    ArchiveInspector::open(file)?.read_record_table(entry)
}

/// Open `file` and check whether any entry begins with `prefix`.
pub fn has_entry_with_prefix(file: &Path, prefix: &str) -> Result<bool, ArchiveError> {
    Ok(ArchiveInspector::open(file)?.has_entry_with_prefix(prefix))
}

/// Convert a class name in dotted or internal form to the archive entry that
/// would hold it: `a.b.C` and `a/b/C` both become `a/b/C.class`.
pub fn class_entry_name(class: &str) -> String {
    let internal = class.trim_end_matches(".class").replace('.', "/");
    format!("{}.class", internal)
}

/// Convert a class name to internal (slash-separated) form.
pub fn internal_name(class: &str) -> String {
    class.trim_end_matches(".class").replace('.', "/")
}
