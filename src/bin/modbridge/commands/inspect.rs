//! `modbridge inspect` command

use anyhow::Result;

use crate::cli::InspectArgs;
use crate::commands::load_config;
use modbridge::ops::{inspect_file, ResolveOptions};
use modbridge::util::hash;

pub fn execute(args: InspectArgs) -> Result<()> {
    if !args.file.is_file() {
        anyhow::bail!("no such file: {}", args.file.display());
    }

    let config = load_config()?;
    let mut opts = ResolveOptions::from_config(&config);
    if let Some(descriptor) = args.descriptor {
        opts.descriptor = descriptor;
    }

    let report = inspect_file(&args.file, &opts);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}: {}", report.path.display(), report.outcome);
    if let Some(metadata) = &report.metadata {
        println!("  version:  {}", metadata.module_version);
        println!("  platform: {}", metadata.target_platform_version);
    }
    if let Some(fingerprint) = &report.fingerprint {
        println!("  sha256:   {}", hash::short(fingerprint));
    }
    if let Some(marker) = &report.marker {
        println!("  marker:   {} ({} fields)", marker.class_name, marker.fields.len());
        for field in &marker.fields {
            if let Some(literal) = &field.literal {
                println!("    {} = {}", field.name, literal);
            }
        }
    }
    if let Some(diagnostic) = report.diagnostic() {
        println!();
        print!("{}", diagnostic.format(false));
    }

    Ok(())
}
