//! `modbridge check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use crate::commands::{load_config, patches_path, resolve_options};
use modbridge::ops::{check_patches, format_report, CheckOptions};
use modbridge::util::diagnostic::emit;

pub fn execute(args: CheckArgs, verbose: bool, color: bool) -> Result<()> {
    let config = load_config()?;
    let options = CheckOptions {
        patches: patches_path(&config, &args.patch)?,
        classpath: args.patch.classpath.clone(),
        marker: config.shim_marker().to_string(),
        resolve: resolve_options(&config, &args.module),
    };

    let report = check_patches(&options)?;

    for warning in report.patches.iter().filter_map(|p| p.warning()) {
        emit(&warning, color);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, verbose));
    }

    // Exit with error code if any active patch failed to bind
    if !report.is_ok() {
        std::process::exit(1);
    }

    Ok(())
}
