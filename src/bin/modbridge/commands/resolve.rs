//! `modbridge resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::{load_config, resolve_options};
use modbridge::ops::resolve_module;
use modbridge::util::hash;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let config = load_config()?;
    let opts = resolve_options(&config, &args.module);

    let handle = resolve_module(&opts)?;

    if args.json {
        let json = serde_json::json!({
            "outcome": handle.resolved().outcome(),
            "path": handle.path(),
            "variant": handle.variant(),
            "metadata": handle.metadata(),
            "fingerprint": handle.fingerprint(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let metadata = handle.metadata();
    println!("{}", handle.resolved().outcome());
    println!("  path:     {}", handle.path().display());
    println!("  version:  {}", metadata.module_version);
    println!("  platform: {}", metadata.target_platform_version);
    println!("  sha256:   {}", hash::short(handle.fingerprint()));

    Ok(())
}
