//! Test fixtures for common test scenarios.
//!
//! A host class with a fog setup method and a patch file weaving two
//! companion bindings into it.

use crate::archive::classfile::ACC_STATIC;
use crate::archive::Literal;
use crate::shim::host::{HostClass, HostMethod, Insn, LocalVariable};

/// Companion class supplying the fog bindings.
pub const MIXIN_OWNER: &str = "io/github/apace100/apoli/mixin/BackgroundRendererMixin";

/// Host class the fog patches target.
pub const FOG_TARGET: &str = "net/minecraft/client/render/BackgroundRenderer";

pub const CAMERA: &str = "Lnet/minecraft/client/render/Camera;";

/// Patch file with one conditional patch of two stubs against
/// [`FOG_TARGET`].
pub const FOG_PATCHES: &str = r#"
[[patch]]
id = "apoli-background-renderer"
target = "net/minecraft/client/render/BackgroundRenderer"
requires = "io.github.apace100.apoli.mixin.BackgroundRendererMixin"
owner = "io/github/apace100/apoli/mixin/BackgroundRendererMixin"

[[patch.stub]]
name = "shim_redirectFogStart"
descriptor = "(FLnet/minecraft/client/render/Camera;)V"
strategy = "redirect"
method = "setupFog"
target = "Lcom/mojang/blaze3d/systems/RenderSystem;setShaderFogStart(F)V"

[[patch.stub]]
name = "shim_modifyLavaVisibility"
descriptor = "(FLnet/minecraft/client/render/Camera;)F"
strategy = "modify-constant"
method = "setupFog"
constant = { float = 0.25 }
ordinal = 1
"#;

/// `BackgroundRenderer` with a single static `setupFog(Camera, float, boolean)`.
pub fn fog_host_class() -> HostClass {
    let render_system = "com/mojang/blaze3d/systems/RenderSystem";
    HostClass {
        name: FOG_TARGET.to_string(),
        methods: vec![HostMethod {
            name: "setupFog".to_string(),
            descriptor: format!("({}FZ)V", CAMERA),
            access: ACC_STATIC,
            locals: vec![
                LocalVariable {
                    slot: 3,
                    descriptor: "F".to_string(),
                    name: Some("start".to_string()),
                },
                LocalVariable {
                    slot: 4,
                    descriptor: "F".to_string(),
                    name: Some("end".to_string()),
                },
            ],
            code: vec![
                Insn::Const {
                    value: Literal::Float(0.25),
                },
                Insn::Store {
                    ty: "F".to_string(),
                    slot: 3,
                },
                Insn::Const {
                    value: Literal::Float(0.25),
                },
                Insn::Store {
                    ty: "F".to_string(),
                    slot: 4,
                },
                Insn::load("F", 3),
                Insn::invoke_static(render_system, "setShaderFogStart", "(F)V"),
                Insn::load("F", 4),
                Insn::invoke_static(render_system, "setShaderFogEnd", "(F)V"),
                Insn::Other {
                    text: "return".to_string(),
                },
            ],
        }],
    }
}
