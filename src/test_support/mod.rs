//! Test utilities for modbridge unit tests.
//!
//! Builders for class files and jar archives, so tests can lay out module
//! directories on disk without shipping binary fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use modbridge::test_support::{module_jar, JarBuilder};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     module_jar("HD_U_I6", "1.20.1").write(tmp.path(), "module.jar");
//!     JarBuilder::new()
//!         .entry("fabric.mod.json", b"{}".to_vec())
//!         .write(tmp.path(), "other.jar");
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::archive::classfile::{ACC_STATIC, CLASS_MAGIC};
use crate::resolver::classify::{DEFAULT_MARKER_ENTRY, DEFAULT_PLATFORM_FIELD, DEFAULT_VERSION_FIELD};

// Re-export fixtures for convenience
pub use fixtures::*;

static SINK_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or write the process-wide last-error sink.
pub fn sink_guard() -> MutexGuard<'static, ()> {
    SINK_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

const ACC_PUBLIC: u16 = 0x0001;
const ACC_FINAL: u16 = 0x0010;
const ACC_SUPER: u16 = 0x0020;

/// Constant pool under construction. Entries are deduplicated.
#[derive(Debug, Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    count: u16,
    index: HashMap<Vec<u8>, u16>,
}

impl PoolBuilder {
    fn add(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(index) = self.index.get(&entry) {
            return *index;
        }
        let index = self.count + 1;
        self.bytes.extend_from_slice(&entry);
        self.count += slots;
        self.index.insert(entry, index);
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let mut entry = vec![1];
        entry.extend_from_slice(&(s.len() as u16).to_be_bytes());
        entry.extend_from_slice(s.as_bytes());
        self.add(entry, 1)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        let mut entry = vec![7];
        entry.extend_from_slice(&name.to_be_bytes());
        self.add(entry, 1)
    }

    fn string(&mut self, value: &str) -> u16 {
        let value = self.utf8(value);
        let mut entry = vec![8];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 1)
    }

    fn int(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 1)
    }

    fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 2)
    }
}

#[derive(Debug, Clone)]
enum FieldValue {
    String(String),
    Int(i32),
    Long(i64),
}

#[derive(Debug, Clone)]
struct MemberSpec {
    access: u16,
    name: String,
    descriptor: String,
}

/// Builds minimal but well-formed class files.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    name: String,
    fields: Vec<(MemberSpec, FieldValue)>,
    methods: Vec<MemberSpec>,
}

impl ClassFileBuilder {
    pub fn new(name: &str) -> Self {
        ClassFileBuilder {
            name: name.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Add a `public static final String` constant.
    pub fn string_field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((
            Self::constant(name, "Ljava/lang/String;"),
            FieldValue::String(value.to_string()),
        ));
        self
    }

    /// Add a `public static final int` constant.
    pub fn int_field(mut self, name: &str, value: i32) -> Self {
        self.fields
            .push((Self::constant(name, "I"), FieldValue::Int(value)));
        self
    }

    /// Add a `public static final long` constant.
    pub fn long_field(mut self, name: &str, value: i64) -> Self {
        self.fields
            .push((Self::constant(name, "J"), FieldValue::Long(value)));
        self
    }

    pub fn static_method(mut self, name: &str, descriptor: &str) -> Self {
        self.methods.push(MemberSpec {
            access: ACC_PUBLIC | ACC_STATIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub fn instance_method(mut self, name: &str, descriptor: &str) -> Self {
        self.methods.push(MemberSpec {
            access: ACC_PUBLIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    fn constant(name: &str, descriptor: &str) -> MemberSpec {
        MemberSpec {
            access: ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();
        let this_class = pool.class(&self.name);
        let super_class = pool.class("java/lang/Object");

        let mut body = Vec::new();
        body.extend_from_slice(&(ACC_PUBLIC | ACC_SUPER).to_be_bytes());
        body.extend_from_slice(&this_class.to_be_bytes());
        body.extend_from_slice(&super_class.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());

        body.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for (spec, value) in &self.fields {
            let name = pool.utf8(&spec.name);
            let descriptor = pool.utf8(&spec.descriptor);
            let attr_name = pool.utf8("ConstantValue");
            let value = match value {
                FieldValue::String(s) => pool.string(s),
                FieldValue::Int(v) => pool.int(*v),
                FieldValue::Long(v) => pool.long(*v),
            };
            body.extend_from_slice(&spec.access.to_be_bytes());
            body.extend_from_slice(&name.to_be_bytes());
            body.extend_from_slice(&descriptor.to_be_bytes());
            body.extend_from_slice(&1u16.to_be_bytes());
            body.extend_from_slice(&attr_name.to_be_bytes());
            body.extend_from_slice(&2u32.to_be_bytes());
            body.extend_from_slice(&value.to_be_bytes());
        }

        body.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for spec in &self.methods {
            let name = pool.utf8(&spec.name);
            let descriptor = pool.utf8(&spec.descriptor);
            body.extend_from_slice(&spec.access.to_be_bytes());
            body.extend_from_slice(&name.to_be_bytes());
            body.extend_from_slice(&descriptor.to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());
        }

        // No class attributes
        body.extend_from_slice(&0u16.to_be_bytes());

        let mut out = Vec::new();
        out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&61u16.to_be_bytes());
        out.extend_from_slice(&(pool.count + 1).to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

/// Writes zip archives with arbitrary entries.
#[derive(Debug, Clone, Default)]
pub struct JarBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl JarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, name: &str, contents: Vec<u8>) -> Self {
        self.entries.push((name.to_string(), contents));
        self
    }

    /// Write the archive to `dir/file_name` and return its path.
    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(file_name);
        let file = std::fs::File::create(&path).unwrap();

        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in &self.entries {
            zip.start_file(name.as_str(), zip::write::FileOptions::default())
                .unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
        path
    }
}

/// A module archive: a marker class carrying version constants plus any
/// other entries.
#[derive(Debug, Clone)]
pub struct ModuleJar {
    marker: String,
    version: Option<String>,
    platform: Option<String>,
    jar: JarBuilder,
}

impl Default for ModuleJar {
    fn default() -> Self {
        ModuleJar {
            marker: DEFAULT_MARKER_ENTRY.to_string(),
            version: None,
            platform: None,
            jar: JarBuilder::new(),
        }
    }
}

impl ModuleJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry name of the marker class.
    pub fn marker(mut self, entry: &str) -> Self {
        self.marker = entry.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    pub fn entry(mut self, name: &str, contents: Vec<u8>) -> Self {
        self.jar = self.jar.entry(name, contents);
        self
    }

    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let class_name = self
            .marker
            .strip_suffix(".class")
            .unwrap_or(&self.marker);
        let mut class = ClassFileBuilder::new(class_name);
        if let Some(version) = &self.version {
            class = class.string_field(DEFAULT_VERSION_FIELD, version);
        }
        if let Some(platform) = &self.platform {
            class = class.string_field(DEFAULT_PLATFORM_FIELD, platform);
        }

        self.jar
            .clone()
            .entry(&self.marker, class.build())
            .write(dir, file_name)
    }
}

/// A module archive with both version constants set.
pub fn module_jar(version: &str, platform: &str) -> ModuleJar {
    ModuleJar::new().version(version).platform(platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::classfile::{decode, Literal};
    use tempfile::TempDir;

    #[test]
    fn test_class_file_builder_decodes() {
        let bytes = ClassFileBuilder::new("a/B")
            .string_field("S", "x")
            .string_field("T", "x")
            .long_field("L", 7)
            .int_field("I", 3)
            .static_method("m", "()V")
            .build();

        let table = decode(&bytes).unwrap();
        assert_eq!(table.fields.len(), 4);
        assert_eq!(table.string_constant("T"), Some("x"));
        assert_eq!(table.field("L").unwrap().literal, Some(Literal::Long(7)));
        assert_eq!(table.field("I").unwrap().literal, Some(Literal::Int(3)));
    }

    #[test]
    fn test_module_jar_layout() {
        let tmp = TempDir::new().unwrap();
        let path = module_jar("HD_U_I6", "1.20.1")
            .entry("patch/a", b"x".to_vec())
            .write(tmp.path(), "m.jar");

        let archive = crate::archive::ArchiveInspector::open(&path).unwrap();
        assert!(archive.contains(DEFAULT_MARKER_ENTRY));
        assert!(archive.contains("patch/a"));
    }
}
