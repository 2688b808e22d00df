//! Conditional shim binding.
//!
//! Patches are declared against host classes. A patch may require a
//! third-party class; it is only woven when that class is present. Each
//! patch carries stub extension points which are bound, at weave time, to
//! static methods of the companion module and wired into the host class.
//!
//! - `declaration`: patch and stub declarations
//! - `gate`: presence-keyed activation
//! - `binding`: stub to companion method resolution
//! - `host`, `rewrite`: the host instruction model and its rewrites
//! - `weaver`: per-class driver

pub mod binding;
pub mod declaration;
pub mod descriptor;
pub mod gate;
pub mod host;
pub mod rewrite;
pub mod weaver;

pub use binding::{BindingError, CompanionBinding, ShimBindingResolver, DEFAULT_SHIM_MARKER};
pub use declaration::{BindingStrategy, PatchDeclaration, PatchSet, StubPoint};
pub use gate::{ClassPresence, ClasspathPresence, PatchGate, StaticPresence};
pub use host::{HostClass, HostMethod, Insn, InvokeKind, LocalVariable};
pub use weaver::{WeaveReport, Weaver};
