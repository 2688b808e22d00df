//! High-level operations.
//!
//! This module contains the implementation of modbridge commands.

pub mod check;
pub mod inspect;
pub mod resolve;
pub mod weave;

pub use check::{check_against, check_patches, format_report, CheckOptions, CheckReport, PatchStatus};
pub use inspect::{inspect_file, InspectReport};
pub use resolve::{
    report_resolve_error, resolve_artifact, resolve_module, ResolveOptions, ResolveReport,
};
pub use weave::{load_host_class, weave_class, weave_reported, weave_with, WeaveOptions};
