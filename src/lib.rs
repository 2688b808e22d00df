//! modbridge - Discovery and shim binding for an optional closed-source module
//!
//! This crate finds and validates the module's archive without loading it,
//! records the accepted artifact process-wide, and binds stub extension
//! points in host classes to the module's real implementations when the
//! patches declaring them are active.

pub mod archive;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod shim;
pub mod util;

/// Test utilities for modbridge unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides builders for class files and jar archives.
#[cfg(test)]
pub mod test_support;

pub use core::{
    module::ModuleHandle, outcome::ArtifactOutcome, outcome::VersionMetadata,
    report::ErrorReport,
};

pub use resolver::{ArtifactClassifier, ArtifactResolver, ResolveError, ResolvedModule};
pub use shim::{PatchSet, Weaver};
pub use util::config::Config;
