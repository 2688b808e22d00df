//! modbridge CLI - Discovery and shim binding for an optional module

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use modbridge::util::diagnostic::emit;
use modbridge::ResolveError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<ResolveError>() {
            Some(err) => emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("modbridge=debug")
    } else {
        EnvFilter::new("modbridge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
        Commands::Check(args) => commands::check::execute(args, cli.verbose, color),
        Commands::Weave(args) => commands::weave::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
