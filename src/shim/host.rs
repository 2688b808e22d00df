//! Instruction-level model of a host class handed over for weaving.
//!
//! The host decodes its own class into this model, lets the weaver rewrite
//! it, and re-encodes the result. Only the instructions that shim bindings
//! care about are spelled out; everything else is carried through opaquely.

use serde::{Deserialize, Serialize};

use crate::archive::classfile::ACC_STATIC;
use crate::archive::Literal;
use crate::shim::descriptor::{slot_size, DescriptorError, MethodDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeKind {
    Static,
    Virtual,
    Special,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Insn {
    Invoke {
        kind: InvokeKind,
        owner: String,
        name: String,
        descriptor: String,
    },
    /// Push a literal constant
    Const { value: Literal },
    /// Load a local variable of type `ty` from `slot`
    Load { ty: String, slot: u16 },
    /// Store into a local variable
    Store { ty: String, slot: u16 },
    /// Any other instruction
    Other { text: String },
}

impl Insn {
    pub fn invoke_static(owner: &str, name: &str, descriptor: &str) -> Self {
        Insn::Invoke {
            kind: InvokeKind::Static,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }

    pub fn load(ty: &str, slot: u16) -> Self {
        Insn::Load {
            ty: ty.to_string(),
            slot,
        }
    }
}

/// A local variable in scope in a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub slot: u16,
    pub descriptor: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMethod {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub access: u16,
    /// Non-argument locals, in declaration order
    #[serde(default)]
    pub locals: Vec<LocalVariable>,
    pub code: Vec<Insn>,
}

impl HostMethod {
    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }

    /// Declared arguments with the slot each one occupies. The receiver of
    /// an instance method is not included.
    pub fn arguments(&self) -> Result<Vec<(String, u16)>, DescriptorError> {
        let descriptor = MethodDescriptor::parse(&self.descriptor)?;
        let mut slot = if self.is_static() { 0 } else { 1 };
        Ok(descriptor
            .params
            .into_iter()
            .map(|ty| {
                let this = slot;
                slot += slot_size(&ty);
                (ty, this)
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostClass {
    /// Internal name
    pub name: String,
    pub methods: Vec<HostMethod>,
}
