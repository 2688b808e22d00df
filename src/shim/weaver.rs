//! Class-level weaving.
//!
//! The host asks the weaver to weave a class when it is about to load it.
//! Every active patch targeting the class is bound and applied to a copy of
//! the class; the copy replaces the original only when all of them succeed.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;

use crate::archive::internal_name;
use crate::core::class_table::ClassTable;
use crate::shim::binding::{BindingError, CompanionBinding, ShimBindingResolver, DEFAULT_SHIM_MARKER};
use crate::shim::declaration::{PatchDeclaration, PatchSet};
use crate::shim::descriptor::MethodSelector;
use crate::shim::gate::{ClassPresence, PatchGate};
use crate::shim::host::HostClass;
use crate::shim::rewrite::Rewriter;

/// What a weave pass did to one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeaveReport {
    pub class: String,
    /// Bindings that were applied, in patch then stub order
    pub applied: Vec<CompanionBinding>,
    /// Patches targeting the class that were inactive
    pub skipped: Vec<String>,
    /// The class had already been woven; nothing was done
    pub already_woven: bool,
}

impl WeaveReport {
    pub fn is_modified(&self) -> bool {
        !self.applied.is_empty()
    }
}

pub struct Weaver<'a> {
    patches: &'a PatchSet,
    classes: &'a dyn ClassTable,
    presence: &'a dyn ClassPresence,
    gate: PatchGate,
    marker: String,
    woven: Mutex<HashSet<String>>,
}

impl<'a> Weaver<'a> {
    pub fn new(
        patches: &'a PatchSet,
        classes: &'a dyn ClassTable,
        presence: &'a dyn ClassPresence,
    ) -> Self {
        Weaver {
            patches,
            classes,
            presence,
            gate: PatchGate::new(),
            marker: DEFAULT_SHIM_MARKER.to_string(),
            woven: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn gate(&self) -> &PatchGate {
        &self.gate
    }

    /// Whether `class` has been woven by this weaver.
    pub fn is_woven(&self, class: &str) -> bool {
        self.woven
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&internal_name(class))
    }

    /// Weave every active patch targeting `class` into it.
    pub fn weave(&self, class: &mut HostClass) -> Result<WeaveReport, BindingError> {
        let name = internal_name(&class.name);
        let mut report = WeaveReport {
            class: name.clone(),
            ..WeaveReport::default()
        };

        if !self
            .woven
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone())
        {
            tracing::debug!("class `{}` already woven", name);
            report.already_woven = true;
            return Ok(report);
        }

        match self.weave_copy(class, &mut report) {
            Ok(woven) => {
                if report.is_modified() {
                    tracing::info!(
                        "wove {} binding(s) into `{}`",
                        report.applied.len(),
                        name
                    );
                }
                *class = woven;
                Ok(report)
            }
            Err(e) => {
                tracing::warn!("failed to weave `{}`: {}", name, e);
                self.woven
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .remove(&name);
                Err(e)
            }
        }
    }

    fn weave_copy(
        &self,
        class: &HostClass,
        report: &mut WeaveReport,
    ) -> Result<HostClass, BindingError> {
        let resolver = ShimBindingResolver::new(self.classes).with_marker(self.marker.clone());
        let mut working = class.clone();

        let patches: Vec<&PatchDeclaration> = self.patches.for_class(&class.name).collect();
        for patch in patches {
            if !self.gate.is_active(patch, self.presence) {
                report.skipped.push(patch.id.clone());
                continue;
            }

            // Bind everything before touching any method
            let bindings = resolver.resolve_patch(patch)?;
            for (stub, binding) in patch.stubs.iter().zip(&bindings) {
                let selector = MethodSelector::parse(stub.strategy.method()).map_err(|e| {
                    BindingError::SignatureMismatch {
                        patch: patch.id.clone(),
                        stub: stub.name.clone(),
                        detail: e.to_string(),
                    }
                })?;
                let rewriter = Rewriter::new(binding, &stub.strategy)?;

                let mut matched = false;
                for method in working
                    .methods
                    .iter_mut()
                    .filter(|m| selector.matches(&m.name, &m.descriptor))
                {
                    rewriter.apply(method)?;
                    matched = true;
                }
                if !matched {
                    return Err(BindingError::MethodNotFound {
                        patch: patch.id.clone(),
                        class: working.name.clone(),
                        method: stub.strategy.method().to_string(),
                    });
                }
            }
            report.applied.extend(bindings);
        }

        Ok(working)
    }
}
