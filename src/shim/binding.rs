//! Resolution of stub extension points against the companion module.
//!
//! A stub `shim_modifyD` with descriptor `(D)D` binds to a static method
//! `modifyD(D)D` in the patch's owner class. Any stub that fails to bind is
//! an error: the declarations and the module have drifted apart, and
//! silently skipping the stub would leave the host half-patched.

use serde::Serialize;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::core::class_table::ClassTable;
use crate::core::outcome::ArtifactOutcome;
use crate::shim::declaration::{PatchDeclaration, StubPoint};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Prefix marking a stub name; stripped to get the real method's name.
pub const DEFAULT_SHIM_MARKER: &str = "shim_";

/// A stub resolved to a concrete method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionBinding {
    pub patch: String,
    pub stub: String,
    /// Class providing the implementation
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// Failure binding or applying a stub. Always a defect in the bridge.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("stub `{stub}` of patch `{patch}` does not start with the stub marker `{marker}`")]
    UnmarkedStub {
        patch: String,
        stub: String,
        marker: String,
    },

    #[error("cannot bind stub `{stub}` of patch `{patch}`: class `{owner}` is not in the module")]
    MissingOwner {
        patch: String,
        stub: String,
        owner: String,
    },

    #[error("cannot bind stub `{stub}` of patch `{patch}`: no static method `{name}{descriptor}` in `{owner}`")]
    MissingBinding {
        patch: String,
        stub: String,
        owner: String,
        name: String,
        descriptor: String,
    },

    #[error("cannot read class table for patch `{patch}`")]
    ClassTable {
        patch: String,
        #[source]
        source: ArchiveError,
    },

    #[error("patch `{patch}` targets method `{method}` which `{class}` does not have")]
    MethodNotFound {
        patch: String,
        class: String,
        method: String,
    },

    #[error("stub `{stub}` of patch `{patch}` found no injection point in `{method}`: {detail}")]
    InjectionPoint {
        patch: String,
        stub: String,
        method: String,
        detail: String,
    },

    #[error("stub `{stub}` of patch `{patch}` does not fit its injection point: {detail}")]
    SignatureMismatch {
        patch: String,
        stub: String,
        detail: String,
    },
}

impl BindingError {
    pub fn outcome(&self) -> ArtifactOutcome {
        ArtifactOutcome::InternalError
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let BindingError::ClassTable { source, .. } = self {
            diag = diag.with_context(format!("caused by: {}", source));
        }
        diag.with_context("the patch declarations do not match the installed module")
            .with_suggestion(suggestions::REPORT_BUG)
    }
}

/// Resolves stubs against a class table.
pub struct ShimBindingResolver<'a> {
    classes: &'a dyn ClassTable,
    marker: String,
}

impl<'a> ShimBindingResolver<'a> {
    pub fn new(classes: &'a dyn ClassTable) -> Self {
        ShimBindingResolver {
            classes,
            marker: DEFAULT_SHIM_MARKER.to_string(),
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Name of the method a stub binds to, or `None` if the stub name does
    /// not carry the marker.
    pub fn derived_name<'s>(&self, stub: &'s StubPoint) -> Option<&'s str> {
        stub.name
            .strip_prefix(self.marker.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Resolve a single stub of `patch`.
    pub fn resolve_stub(
        &self,
        patch: &PatchDeclaration,
        stub: &StubPoint,
    ) -> Result<CompanionBinding, BindingError> {
        let owner = self
            .classes
            .lookup(&patch.owner)
            .map_err(|source| BindingError::ClassTable {
                patch: patch.id.clone(),
                source,
            })?
            .ok_or_else(|| BindingError::MissingOwner {
                patch: patch.id.clone(),
                stub: stub.name.clone(),
                owner: patch.owner.clone(),
            })?;

        let name = self
            .derived_name(stub)
            .ok_or_else(|| BindingError::UnmarkedStub {
                patch: patch.id.clone(),
                stub: stub.name.clone(),
                marker: self.marker.clone(),
            })?;
        let method = owner
            .method(name, &stub.descriptor)
            .filter(|m| m.is_static())
            .ok_or_else(|| BindingError::MissingBinding {
                patch: patch.id.clone(),
                stub: stub.name.clone(),
                owner: owner.class_name.clone(),
                name: name.to_string(),
                descriptor: stub.descriptor.clone(),
            })?;

        tracing::debug!(
            "bound stub `{}` to {}.{}{}",
            stub.name,
            owner.class_name,
            method.name,
            method.descriptor
        );

        Ok(CompanionBinding {
            patch: patch.id.clone(),
            stub: stub.name.clone(),
            owner: owner.class_name.clone(),
            name: method.name.clone(),
            descriptor: method.descriptor.clone(),
        })
    }

    /// Resolve every stub of `patch`, in declaration order.
    pub fn resolve_patch(
        &self,
        patch: &PatchDeclaration,
    ) -> Result<Vec<CompanionBinding>, BindingError> {
        patch
            .stubs
            .iter()
            .map(|stub| self.resolve_stub(patch, stub))
            .collect()
    }
}
