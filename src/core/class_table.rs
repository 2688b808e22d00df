//! Lookup of class records in the companion module.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::archive::{class_entry_name, internal_name, open_record_entry, ArchiveError, RecordTable};

/// A table of classes that shim bindings are resolved against.
pub trait ClassTable: Send + Sync {
    /// Look up a class by dotted or internal name.
    fn lookup(&self, class: &str) -> Result<Option<Arc<RecordTable>>, ArchiveError>;
}

/// Class table backed by a module archive.
///
/// Each lookup opens the archive, decodes one class and closes it again.
/// Decoded classes are cached by name.
#[derive(Debug)]
pub struct ArchiveClassTable {
    path: PathBuf,
    cache: RwLock<HashMap<String, Option<Arc<RecordTable>>>>,
}

impl ArchiveClassTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ArchiveClassTable {
            path: path.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClassTable for ArchiveClassTable {
    fn lookup(&self, class: &str) -> Result<Option<Arc<RecordTable>>, ArchiveError> {
        let key = internal_name(class);
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Ok(cached.clone());
        }

        let record = open_record_entry(&self.path, &class_entry_name(&key))?.map(Arc::new);
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, record.clone());
        Ok(record)
    }
}

/// Class table held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryClassTable {
    classes: HashMap<String, Arc<RecordTable>>,
}

impl MemoryClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: RecordTable) {
        self.classes
            .insert(table.class_name.clone(), Arc::new(table));
    }

    pub fn with(mut self, table: RecordTable) -> Self {
        self.insert(table);
        self
    }
}

impl ClassTable for MemoryClassTable {
    fn lookup(&self, class: &str) -> Result<Option<Arc<RecordTable>>, ArchiveError> {
        Ok(self.classes.get(&internal_name(class)).cloned())
    }
}
