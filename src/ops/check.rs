//! Patch declaration checks.
//!
//! Evaluates every declared patch against a classpath and the resolved
//! module without weaving anything: which patches would activate, and
//! whether every stub of the active ones binds.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::class_table::{ArchiveClassTable, ClassTable};
use crate::ops::resolve::{resolve_artifact, ResolveOptions, ResolveReport};
use crate::shim::{
    ClassPresence, ClasspathPresence, CompanionBinding, PatchGate, PatchSet, ShimBindingResolver,
};
use crate::util::diagnostic::Diagnostic;

/// Options for checking patch declarations.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Patch declaration file
    pub patches: PathBuf,

    /// Classpath roots consulted for required classes
    pub classpath: Vec<PathBuf>,

    /// Stub name marker
    pub marker: String,

    /// How to find the module
    pub resolve: ResolveOptions,
}

/// State of one declared patch.
#[derive(Debug, Clone, Serialize)]
pub struct PatchStatus {
    pub id: String,
    pub target: String,
    pub requires: Option<String>,
    pub active: bool,
    pub bindings: Vec<CompanionBinding>,
    /// Why binding failed
    pub error: Option<String>,
}

impl PatchStatus {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Warning for a patch that will not be woven.
    pub fn warning(&self) -> Option<Diagnostic> {
        if self.active {
            return None;
        }
        let class = self.requires.as_deref()?;
        Some(
            Diagnostic::warning(format!("patch `{}` is inactive", self.id))
                .with_context(format!("{} is not on the classpath", class))
                .with_suggestion("Add the jar providing it with `--classpath`"),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub module: ResolveReport,
    pub patches: Vec<PatchStatus>,
}

impl CheckReport {
    pub fn failed_count(&self) -> usize {
        self.patches.iter().filter(|p| !p.is_ok()).count()
    }

    pub fn active_count(&self) -> usize {
        self.patches.iter().filter(|p| p.active).count()
    }

    pub fn is_ok(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Resolve the module and check every declared patch against it.
pub fn check_patches(opts: &CheckOptions) -> Result<CheckReport> {
    let patches = PatchSet::load(&opts.patches)?;
    let module = resolve_artifact(&opts.resolve)?;

    let classes = ArchiveClassTable::new(&module.module.path);
    let presence = ClasspathPresence::new(opts.classpath.clone());
    let patches = check_against(&patches, &classes, &presence, &opts.marker);

    Ok(CheckReport { module, patches })
}

/// Check `patches` against an explicit class table and classpath.
pub fn check_against(
    patches: &PatchSet,
    classes: &dyn ClassTable,
    presence: &dyn ClassPresence,
    marker: &str,
) -> Vec<PatchStatus> {
    let gate = PatchGate::new();
    let resolver = ShimBindingResolver::new(classes).with_marker(marker);

    patches
        .iter()
        .map(|patch| {
            let active = gate.is_active(patch, presence);
            let (bindings, error) = if active {
                match resolver.resolve_patch(patch) {
                    Ok(bindings) => (bindings, None),
                    Err(e) => {
                        tracing::warn!("{}", e);
                        (Vec::new(), Some(e.to_string()))
                    }
                }
            } else {
                (Vec::new(), None)
            };

            PatchStatus {
                id: patch.id.clone(),
                target: patch.target.clone(),
                requires: patch.required_class().map(str::to_string),
                active,
                bindings,
                error,
            }
        })
        .collect()
}

/// Format a check report for display.
pub fn format_report(report: &CheckReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    let module = &report.module.module;

    let _ = writeln!(
        output,
        "Module: {} {} ({}) at {}",
        module.variant,
        module.metadata.module_version,
        module.metadata.target_platform_version,
        module.path.display()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "Patches:");
    for patch in &report.patches {
        let status = match (patch.active, patch.is_ok()) {
            (false, _) => "[--]",
            (true, true) => "[OK]",
            (true, false) => "[!!]",
        };
        let _ = writeln!(output, "  {} {} -> {}", status, patch.id, patch.target);

        if !patch.active {
            if let Some(class) = &patch.requires {
                let _ = writeln!(output, "      inactive: {} is not on the classpath", class);
            }
        }
        if let Some(error) = &patch.error {
            let _ = writeln!(output, "      {}", error);
        }
        if verbose {
            for binding in &patch.bindings {
                let _ = writeln!(
                    output,
                    "      {} => {}.{}{}",
                    binding.stub, binding.owner, binding.name, binding.descriptor
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Summary: {} patch(es), {} active, {} failed",
        report.patches.len(),
        report.active_count(),
        report.failed_count()
    );

    output
}
