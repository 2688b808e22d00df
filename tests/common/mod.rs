//! Fixtures shared by the CLI integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

pub const MIXIN_OWNER: &str = "io/github/apace100/apoli/mixin/BackgroundRendererMixin";

pub const PATCHES: &str = r#"
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
"#;

pub const HOST_CLASS: &str = r#"{
  "name": "net/minecraft/client/render/BackgroundRenderer",
  "methods": [{
    "name": "setupFog",
    "descriptor": "(Lnet/minecraft/client/render/Camera;FZ)V",
    "access": 8,
    "code": [
      {"op": "load", "ty": "F", "slot": 1},
      {"op": "invoke", "kind": "static", "owner": "com/mojang/blaze3d/systems/RenderSystem", "name": "setShaderFogStart", "descriptor": "(F)V"},
      {"op": "other", "text": "return"}
    ]
  }]
}"#;

/// Constant pool under construction.
#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
}

impl Pool {
    fn push(&mut self, tag: u8, payload: &[u8]) -> u16 {
        self.bytes.push(tag);
        self.bytes.extend_from_slice(payload);
        self.count += 1;
        self.count
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let mut payload = (s.len() as u16).to_be_bytes().to_vec();
        payload.extend_from_slice(s.as_bytes());
        self.push(1, &payload)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.push(7, &name.to_be_bytes())
    }

    fn string(&mut self, value: &str) -> u16 {
        let value = self.utf8(value);
        self.push(8, &value.to_be_bytes())
    }
}

/// Minimal class file with string constants and static methods.
pub fn class_file(name: &str, strings: &[(&str, &str)], methods: &[(&str, &str)]) -> Vec<u8> {
    let mut pool = Pool::default();
    let this_class = pool.class(name);
    let super_class = pool.class("java/lang/Object");

    let mut body = Vec::new();
    body.extend_from_slice(&0x0021u16.to_be_bytes());
    body.extend_from_slice(&this_class.to_be_bytes());
    body.extend_from_slice(&super_class.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());

    body.extend_from_slice(&(strings.len() as u16).to_be_bytes());
    for (field, value) in strings {
        let field_name = pool.utf8(field);
        let descriptor = pool.utf8("Ljava/lang/String;");
        let attr = pool.utf8("ConstantValue");
        let string = pool.string(value);

        body.extend_from_slice(&0x0019u16.to_be_bytes());
        body.extend_from_slice(&field_name.to_be_bytes());
        body.extend_from_slice(&descriptor.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&attr.to_be_bytes());
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&string.to_be_bytes());
    }

    body.extend_from_slice(&(methods.len() as u16).to_be_bytes());
    for (method, descriptor) in methods {
        let method_name = pool.utf8(method);
        let method_desc = pool.utf8(descriptor);
        body.extend_from_slice(&0x0009u16.to_be_bytes());
        body.extend_from_slice(&method_name.to_be_bytes());
        body.extend_from_slice(&method_desc.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());
    }
    body.extend_from_slice(&0u16.to_be_bytes());

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&61u16.to_be_bytes());
    out.extend_from_slice(&(pool.count + 1).to_be_bytes());
    out.extend_from_slice(&pool.bytes);
    out.extend_from_slice(&body);
    out
}

/// Write a zip archive with the given entries.
pub fn write_jar(dir: &Path, file_name: &str, entries: &[(&str, Vec<u8>)]) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(file_name);
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    for (name, contents) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Write a module jar carrying the version constants.
pub fn write_module(dir: &Path, file_name: &str, version: &str, platform: &str) -> PathBuf {
    let marker = class_file(
        "net/optifine/Config",
        &[("VERSION", version), ("MC_VERSION", platform)],
        &[],
    );
    let mixin = class_file(
        MIXIN_OWNER,
        &[],
        &[("redirectFogStart", "(FLnet/minecraft/client/render/Camera;)V")],
    );
    let mixin_entry = format!("{}.class", MIXIN_OWNER);
    write_jar(
        dir,
        file_name,
        &[
            ("net/optifine/Config.class", marker),
            (mixin_entry.as_str(), mixin),
        ],
    )
}

/// Write a `version.json` platform descriptor.
pub fn write_descriptor(dir: &Path, platform: &str) -> PathBuf {
    let path = dir.join("version.json");
    std::fs::write(
        &path,
        format!(r#"{{"id": "{}", "type": "release"}}"#, platform),
    )
    .unwrap();
    path
}
