//! Weaving a host class handed over as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::class_table::ClassTable;
use crate::core::report;
use crate::ops::resolve::{resolve_module, ResolveOptions};
use crate::shim::{
    BindingError, ClassPresence, ClasspathPresence, HostClass, PatchSet, WeaveReport, Weaver,
};

/// Options for weaving one class.
#[derive(Debug, Clone)]
pub struct WeaveOptions {
    /// Host class in its JSON instruction form
    pub input: PathBuf,

    /// Patch declaration file
    pub patches: PathBuf,

    /// Classpath roots consulted for required classes
    pub classpath: Vec<PathBuf>,

    /// Stub name marker
    pub marker: String,

    /// How to find the module
    pub resolve: ResolveOptions,
}

/// Read a host class from its JSON form.
pub fn load_host_class(path: &Path) -> Result<HostClass> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read host class: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse host class: {}", path.display()))
}

/// Resolve the module, install it, and weave the input class with it.
pub fn weave_class(opts: &WeaveOptions) -> Result<(HostClass, WeaveReport)> {
    let patches = PatchSet::load(&opts.patches)?;
    let mut class = load_host_class(&opts.input)?;

    let handle = resolve_module(&opts.resolve)?;
    let presence = ClasspathPresence::new(opts.classpath.clone());

    let report = weave_reported(&mut class, &patches, handle.classes(), &presence, &opts.marker)?;
    Ok((class, report))
}

/// Weave `class`, recording a binding failure in the last-error sink.
pub fn weave_reported(
    class: &mut HostClass,
    patches: &PatchSet,
    classes: &dyn ClassTable,
    presence: &dyn ClassPresence,
    marker: &str,
) -> Result<WeaveReport> {
    match weave_with(class, patches, classes, presence, marker) {
        Ok(report) => Ok(report),
        Err(err) => {
            let diagnostic = err.to_diagnostic().format(false);
            report::set_error(diagnostic, Some(err.to_string()), true);
            Err(err).with_context(|| format!("failed to weave `{}`", class.name))
        }
    }
}

/// Weave `class` against an explicit class table and classpath.
pub fn weave_with(
    class: &mut HostClass,
    patches: &PatchSet,
    classes: &dyn ClassTable,
    presence: &dyn ClassPresence,
    marker: &str,
) -> Result<WeaveReport, BindingError> {
    Weaver::new(patches, classes, presence)
        .with_marker(marker)
        .weave(class)
}
