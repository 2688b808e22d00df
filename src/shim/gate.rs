//! Activation of conditional patches.
//!
//! A patch that names a required companion class is only woven when that
//! class exists on the runtime classpath. Existence is all that is checked;
//! the class is never loaded.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::archive::{class_entry_name, ArchiveInspector};
use crate::shim::declaration::PatchDeclaration;

/// Answers whether a class exists at runtime.
pub trait ClassPresence: Send + Sync {
    /// `class` may be dotted or internal.
    fn is_present(&self, class: &str) -> bool;
}

/// A fixed set of present classes.
#[derive(Debug, Default, Clone)]
pub struct StaticPresence {
    classes: HashSet<String>,
}

impl StaticPresence {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        StaticPresence {
            classes: classes
                .into_iter()
                .map(|c| class_entry_name(c.as_ref()))
                .collect(),
        }
    }
}

impl ClassPresence for StaticPresence {
    fn is_present(&self, class: &str) -> bool {
        self.classes.contains(&class_entry_name(class))
    }
}

/// Presence backed by classpath roots: directories of class files and
/// archives. Only entry names are consulted.
#[derive(Debug, Default, Clone)]
pub struct ClasspathPresence {
    roots: Vec<PathBuf>,
}

impl ClasspathPresence {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        ClasspathPresence { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn root_contains(root: &Path, entry: &str) -> bool {
        if root.is_dir() {
            return root.join(entry).is_file();
        }
        match ArchiveInspector::open(root) {
            Ok(archive) => archive.contains(entry),
            Err(e) => {
                tracing::warn!("ignoring unreadable classpath entry: {}", e);
                false
            }
        }
    }
}

impl ClassPresence for ClasspathPresence {
    fn is_present(&self, class: &str) -> bool {
        let entry = class_entry_name(class);
        self.roots
            .iter()
            .any(|root| Self::root_contains(root, &entry))
    }
}

/// Decides, once per patch, whether it is woven.
#[derive(Debug, Default)]
pub struct PatchGate {
    memo: RwLock<HashMap<String, bool>>,
}

impl PatchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `patch` is active. The answer for a patch id never changes
    /// once computed.
    pub fn is_active(&self, patch: &PatchDeclaration, presence: &dyn ClassPresence) -> bool {
        if let Some(active) = self
            .memo
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&patch.id)
        {
            return *active;
        }

        let active = match patch.required_class() {
            None => true,
            Some(class) => presence.is_present(class),
        };
        tracing::debug!(
            "patch `{}` is {}",
            patch.id,
            if active { "active" } else { "inactive" }
        );

        *self
            .memo
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(patch.id.clone())
            .or_insert(active)
    }
}
