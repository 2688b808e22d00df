//! Command implementations

pub mod check;
pub mod completions;
pub mod inspect;
pub mod resolve;
pub mod weave;

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::cli::{ModuleArgs, PatchArgs};
use modbridge::ops::ResolveOptions;
use modbridge::util::config::{self, Config};

/// Configuration applying in the current directory.
pub fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir()?;
    Ok(config::load_for(&cwd))
}

/// Resolve options from config, overridden by command-line flags.
pub fn resolve_options(config: &Config, args: &ModuleArgs) -> ResolveOptions {
    let mut opts = ResolveOptions::from_config(config);
    if let Some(dir) = &args.mods_dir {
        opts.mods_dir = dir.clone();
    }
    if let Some(descriptor) = &args.descriptor {
        opts.descriptor = descriptor.clone();
    }
    opts
}

/// The patch file from the flag or the config.
pub fn patches_path(config: &Config, args: &PatchArgs) -> Result<PathBuf> {
    args.patches
        .clone()
        .or_else(|| config.shim.patches.clone())
        .ok_or_else(|| {
            anyhow!(
                "no patch declarations given\n\
                 help: Pass `--patches <file>` or set `shim.patches` in .modbridge/config.toml"
            )
        })
}
