//! Core data structures for modbridge.
//!
//! - Classification outcomes and version metadata
//! - The platform version oracle
//! - The process-wide module handle and its class table
//! - The last-error sink read by the host's error screen

pub mod class_table;
pub mod module;
pub mod outcome;
pub mod platform;
pub mod report;

pub use class_table::{ArchiveClassTable, ClassTable, MemoryClassTable};
pub use module::{ModuleError, ModuleHandle};
pub use outcome::{ArtifactOutcome, ModuleVariant, VersionMetadata};
pub use platform::{PlatformVersion, VersionDescriptorReader};
pub use report::ErrorReport;
