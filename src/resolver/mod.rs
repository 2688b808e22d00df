//! Module artifact discovery.
//!
//! [`ArtifactClassifier`] decides what a single file is; [`ArtifactResolver`]
//! scans a directory and insists on exactly one compatible copy. Neither ever
//! loads code from a candidate.

pub mod classify;
pub mod errors;
pub mod resolve;

pub use classify::{classify_file, ArtifactClassifier, Classification, ModuleLayout};
pub use errors::ResolveError;
pub use resolve::{ArtifactResolver, ResolvedModule};
