//! CLI integration tests for modbridge.
//!
//! These tests lay out a game directory with a mods folder and run the
//! binary against it.

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{write_descriptor, write_jar, write_module, HOST_CLASS, MIXIN_OWNER, PATCHES};

/// Get the modbridge binary command, isolated from the user's config.
fn modbridge(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("modbridge").unwrap();
    cmd.env("HOME", home)
        .env_remove("MODBRIDGE_MODS_DIR")
        .env_remove("MODBRIDGE_DESCRIPTOR")
        .current_dir(home);
    cmd
}

/// A game directory with an empty mods folder and a 1.20.1 descriptor.
fn game_dir() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let mods = tmp.path().join("mods");
    fs::create_dir_all(&mods).unwrap();
    write_descriptor(tmp.path(), "1.20.1");
    (tmp, mods)
}

// ============================================================================
// modbridge resolve
// ============================================================================

#[test]
fn test_resolve_missing_module() {
    let (tmp, _mods) = game_dir();

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find the module"));
}

#[test]
fn test_resolve_compatible_module() {
    let (tmp, mods) = game_dir();
    write_module(&mods, "OptiFine_1.20.1_HD_U_I6.jar", "HD_U_I6", "1.20.1");

    modbridge(tmp.path())
        .args(["resolve", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"compatible-module\""))
        .stdout(predicate::str::contains("HD_U_I6"));
}

#[test]
fn test_resolve_installer_module() {
    let (tmp, mods) = game_dir();
    let marker = common::class_file(
        "net/optifine/Config",
        &[("VERSION", "HD_U_I6"), ("MC_VERSION", "1.20.1")],
        &[],
    );
    write_jar(
        &mods,
        "installer.jar",
        &[
            ("net/optifine/Config.class", marker),
            ("patch/net/minecraft/Foo.xdelta", b"delta".to_vec()),
        ],
    );

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("compatible-installer-module"));
}

#[test]
fn test_resolve_duplicate_module() {
    let (tmp, mods) = game_dir();
    write_module(&mods, "a.jar", "HD_U_I6", "1.20.1");
    write_module(&mods, "b.jar", "HD_U_I6", "1.20.1");

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("only have 1 copy"))
        .stderr(predicate::str::contains("a.jar"))
        .stderr(predicate::str::contains("b.jar"));
}

#[test]
fn test_resolve_incompatible_module() {
    let (tmp, mods) = game_dir();
    write_module(&mods, "old.jar", "HD_U_H9", "1.19.2");

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires 1.19.2"))
        .stderr(predicate::str::contains("running 1.20.1"));
}

#[test]
fn test_resolve_corrupt_archive() {
    let (tmp, mods) = game_dir();
    fs::write(mods.join("broken.jar"), b"PK\x03\x04 not really").unwrap();

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}

#[test]
fn test_resolve_skips_unrelated_and_hidden_files() {
    let (tmp, mods) = game_dir();
    write_jar(&mods, "sodium.jar", &[("fabric.mod.json", b"{}".to_vec())]);
    fs::write(mods.join(".hidden.jar"), b"garbage").unwrap();
    fs::write(mods.join("notes.txt"), b"garbage").unwrap();
    write_module(&mods, "OptiFine.jar", "HD_U_I6", "1.20.1");

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("OptiFine.jar"));
}

#[test]
fn test_resolve_with_flags() {
    let (tmp, _mods) = game_dir();
    let other = tmp.path().join("instance");
    write_module(&other.join("mods"), "m.jar", "HD_U_I6", "1.19.2");
    write_descriptor(&other, "1.19.2");

    modbridge(tmp.path())
        .args(["resolve", "--mods-dir"])
        .arg(other.join("mods"))
        .arg("--descriptor")
        .arg(other.join("version.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1.19.2"));
}

#[test]
fn test_resolve_uses_project_config() {
    let (tmp, _mods) = game_dir();
    write_module(&tmp.path().join("custom"), "m.jar", "HD_U_I6", "1.20.1");
    fs::create_dir_all(tmp.path().join(".modbridge")).unwrap();
    fs::write(
        tmp.path().join(".modbridge/config.toml"),
        "[module]\nmods_dir = \"custom\"\n",
    )
    .unwrap();

    modbridge(tmp.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("compatible-module"));
}

// ============================================================================
// modbridge inspect
// ============================================================================

#[test]
fn test_inspect_reports_marker_constants() {
    let (tmp, mods) = game_dir();
    let jar = write_module(&mods, "old.jar", "HD_U_H9", "1.19.2");

    modbridge(tmp.path())
        .arg("inspect")
        .arg(&jar)
        .assert()
        .success()
        .stdout(predicate::str::contains("incompatible-version"))
        .stdout(predicate::str::contains("MC_VERSION = \"1.19.2\""));
}

#[test]
fn test_inspect_json() {
    let (tmp, mods) = game_dir();
    let jar = write_module(&mods, "m.jar", "HD_U_I6", "1.20.1");

    modbridge(tmp.path())
        .args(["inspect", "--json"])
        .arg(&jar)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"compatible-module\""))
        .stdout(predicate::str::contains("\"class_name\": \"net/optifine/Config\""));
}

#[test]
fn test_inspect_missing_file() {
    let (tmp, _mods) = game_dir();

    modbridge(tmp.path())
        .args(["inspect", "nope.jar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such file"));
}

// ============================================================================
// modbridge check
// ============================================================================

#[test]
fn test_check_active_patch_binds() {
    let (tmp, mods) = game_dir();
    let jar = write_module(&mods, "OptiFine.jar", "HD_U_I6", "1.20.1");
    fs::write(tmp.path().join("patches.toml"), PATCHES).unwrap();

    modbridge(tmp.path())
        .args(["check", "--patches", "patches.toml", "--classpath"])
        .arg(&jar)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] apoli-background-renderer"))
        .stdout(predicate::str::contains("1 active, 0 failed"));
}

#[test]
fn test_check_inactive_without_companion_class() {
    let (tmp, mods) = game_dir();
    write_module(&mods, "OptiFine.jar", "HD_U_I6", "1.20.1");
    fs::write(tmp.path().join("patches.toml"), PATCHES).unwrap();

    modbridge(tmp.path())
        .args(["check", "--patches", "patches.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[--] apoli-background-renderer"))
        .stdout(predicate::str::contains("0 active"))
        .stderr(predicate::str::contains(
            "warning: patch `apoli-background-renderer` is inactive",
        ));
}

#[test]
fn test_check_unbound_stub_fails() {
    let (tmp, mods) = game_dir();
    let jar = write_module(&mods, "OptiFine.jar", "HD_U_I6", "1.20.1");
    let patches = PATCHES.replace("shim_redirectFogStart", "shim_redirectFogEnd");
    fs::write(tmp.path().join("patches.toml"), patches).unwrap();

    modbridge(tmp.path())
        .args(["check", "--patches", "patches.toml", "--classpath"])
        .arg(&jar)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[!!]"))
        .stdout(predicate::str::contains("shim_redirectFogEnd"));
}

#[test]
fn test_check_requires_patch_file() {
    let (tmp, _mods) = game_dir();

    modbridge(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no patch declarations given"));
}

// ============================================================================
// modbridge weave
// ============================================================================

#[test]
fn test_weave_redirects_call() {
    let (tmp, mods) = game_dir();
    let jar = write_module(&mods, "OptiFine.jar", "HD_U_I6", "1.20.1");
    fs::write(tmp.path().join("patches.toml"), PATCHES).unwrap();
    fs::write(tmp.path().join("BackgroundRenderer.json"), HOST_CLASS).unwrap();

    modbridge(tmp.path())
        .args(["weave", "BackgroundRenderer.json", "--patches", "patches.toml", "--classpath"])
        .arg(&jar)
        .assert()
        .success()
        .stdout(predicate::str::contains("redirectFogStart"))
        .stdout(predicate::str::contains(MIXIN_OWNER))
        .stdout(predicate::str::contains("setShaderFogStart").not());
}

#[test]
fn test_weave_fails_without_module() {
    let (tmp, _mods) = game_dir();
    fs::write(tmp.path().join("patches.toml"), PATCHES).unwrap();
    fs::write(tmp.path().join("BackgroundRenderer.json"), HOST_CLASS).unwrap();

    modbridge(tmp.path())
        .args(["weave", "BackgroundRenderer.json", "--patches", "patches.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find the module"));
}

// ============================================================================
// modbridge completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    modbridge(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modbridge"));
}
