//! Patch declarations.
//!
//! Patches are declared in a TOML file:
//!
//! ```toml
//! [[patch]]
//! id = "apoli-background-renderer"
//! target = "net/minecraft/client/render/BackgroundRenderer"
//! requires = "io.github.apace100.apoli.mixin.BackgroundRendererMixin"
//! owner = "io/github/apace100/apoli/mixin/BackgroundRendererMixin"
//!
//! [[patch.stub]]
//! name = "shim_redirectFogStart"
//! descriptor = "(FLnet/minecraft/client/render/Camera;)V"
//! strategy = "redirect"
//! method = "setupFog"
//! target = "Lcom/mojang/blaze3d/systems/RenderSystem;setShaderFogStart(F)V"
//! ```
//!
//! A stub carries no behavior. Its real implementation is looked up in the
//! `owner` class of the companion module when the target class is woven.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::archive::{internal_name, Literal};
use crate::shim::descriptor::{MemberRef, MethodDescriptor, MethodSelector};

/// A patch applied to one host class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchDeclaration {
    /// Unique patch identifier
    pub id: String,

    /// Host class the patch rewrites
    pub target: String,

    /// Third-party class whose presence activates the patch
    #[serde(default)]
    pub requires: Option<String>,

    /// Class in the companion module supplying the stubs' behavior
    pub owner: String,

    /// Stub extension points
    #[serde(default, rename = "stub")]
    pub stubs: Vec<StubPoint>,
}

impl PatchDeclaration {
    /// Required companion class, ignoring blank declarations.
    pub fn required_class(&self) -> Option<&str> {
        self.requires.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Whether this patch rewrites `class` (dotted or internal name).
    pub fn targets(&self, class: &str) -> bool {
        internal_name(&self.target) == internal_name(class)
    }
}

/// A named hook awaiting resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubPoint {
    /// Stub name, carrying the shim marker
    pub name: String,

    /// Method descriptor the real implementation must have
    pub descriptor: String,

    /// How the resolved method is wired into the host
    #[serde(flatten)]
    pub strategy: BindingStrategy,
}

/// How a resolved binding replaces behavior in the host method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum BindingStrategy {
    /// Replace a call to `target` with a call to the binding.
    Redirect {
        method: String,
        target: String,
        /// Which call to replace; every call when absent
        #[serde(default)]
        ordinal: Option<usize>,
    },

    /// Pass the `ordinal`-th occurrence of `constant` through the binding.
    ModifyConstant {
        method: String,
        constant: Literal,
        #[serde(default)]
        ordinal: usize,
    },

    /// Pass a local variable through the binding just before the
    /// `at_ordinal`-th call to `at`.
    ModifyVariable {
        method: String,
        at: String,
        #[serde(default)]
        at_ordinal: usize,
        /// Which local of the binding's first parameter type
        #[serde(default)]
        ordinal: usize,
    },
}

impl BindingStrategy {
    /// The host method selector this strategy rewrites.
    pub fn method(&self) -> &str {
        match self {
            BindingStrategy::Redirect { method, .. }
            | BindingStrategy::ModifyConstant { method, .. }
            | BindingStrategy::ModifyVariable { method, .. } => method,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BindingStrategy::Redirect { .. } => "redirect",
            BindingStrategy::ModifyConstant { .. } => "modify-constant",
            BindingStrategy::ModifyVariable { .. } => "modify-variable",
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatchFile {
    #[serde(default, rename = "patch")]
    patches: Vec<PatchDeclaration>,
}

/// All declared patches.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    patches: Vec<PatchDeclaration>,
}

impl PatchSet {
    pub fn new(patches: Vec<PatchDeclaration>) -> Result<Self> {
        let set = PatchSet { patches };
        set.validate()?;
        Ok(set)
    }

    /// Parse declarations from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: PatchFile = toml::from_str(contents).context("failed to parse patch declarations")?;
        Self::new(file.patches)
    }

    /// Load declarations from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read patch declarations: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid patch declarations in {}", path.display()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatchDeclaration> {
        self.patches.iter()
    }

    pub fn get(&self, id: &str) -> Option<&PatchDeclaration> {
        self.patches.iter().find(|p| p.id == id)
    }

    /// Patches that rewrite `class`.
    pub fn for_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a PatchDeclaration> {
        self.patches.iter().filter(move |p| p.targets(class))
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for patch in &self.patches {
            if patch.id.is_empty() {
                bail!("patch targeting `{}` has an empty id", patch.target);
            }
            if !ids.insert(patch.id.as_str()) {
                bail!("duplicate patch id `{}`", patch.id);
            }

            let mut names = HashSet::new();
            for stub in &patch.stubs {
                if !names.insert(stub.name.as_str()) {
                    bail!("patch `{}` declares stub `{}` twice", patch.id, stub.name);
                }
                validate_stub(stub)
                    .with_context(|| format!("patch `{}`, stub `{}`", patch.id, stub.name))?;
            }
        }
        Ok(())
    }
}

fn validate_stub(stub: &StubPoint) -> Result<()> {
    let descriptor = MethodDescriptor::parse(&stub.descriptor)?;
    MethodSelector::parse(stub.strategy.method())?;

    match &stub.strategy {
        BindingStrategy::Redirect { target, .. } => {
            MemberRef::parse(target)?;
        }
        BindingStrategy::ModifyConstant { .. } => {
            if descriptor.params.is_empty() || descriptor.ret == "V" {
                bail!("constant override must take and return the constant's type");
            }
        }
        BindingStrategy::ModifyVariable { at, .. } => {
            MemberRef::parse(at)?;
            if descriptor.params.is_empty() || descriptor.params[0] != descriptor.ret {
                bail!("variable override must take and return the variable's type");
            }
        }
    }
    Ok(())
}
