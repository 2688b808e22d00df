//! `modbridge weave` command

use anyhow::{Context, Result};

use crate::cli::WeaveArgs;
use crate::commands::{load_config, patches_path, resolve_options};
use modbridge::ops::{weave_class, WeaveOptions};

pub fn execute(args: WeaveArgs) -> Result<()> {
    let config = load_config()?;
    let options = WeaveOptions {
        input: args.input.clone(),
        patches: patches_path(&config, &args.patch)?,
        classpath: args.patch.classpath.clone(),
        marker: config.shim_marker().to_string(),
        resolve: resolve_options(&config, &args.module),
    };

    let (class, report) = weave_class(&options)?;
    for patch in &report.skipped {
        tracing::info!("patch `{}` inactive, skipped", patch);
    }

    let json = serde_json::to_string_pretty(&class)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(())
}
