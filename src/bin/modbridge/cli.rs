//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// modbridge - Discover the optional module and check its shim bindings
#[derive(Parser)]
#[command(name = "modbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find and validate the module in the mods folder
    Resolve(ResolveArgs),

    /// Classify a single file
    Inspect(InspectArgs),

    /// Check patch activation and stub bindings against the module
    Check(CheckArgs),

    /// Weave the patches into a host class given as JSON
    Weave(WeaveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where to find the module and the platform version.
#[derive(Args, Clone)]
pub struct ModuleArgs {
    /// Directory scanned for the module
    #[arg(long, env = "MODBRIDGE_MODS_DIR")]
    pub mods_dir: Option<PathBuf>,

    /// Platform version descriptor (JSON)
    #[arg(long, env = "MODBRIDGE_DESCRIPTOR")]
    pub descriptor: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub module: ModuleArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// File to classify
    pub file: PathBuf,

    /// Platform version descriptor (JSON)
    #[arg(long, env = "MODBRIDGE_DESCRIPTOR")]
    pub descriptor: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Patch declarations and the classpath they are gated on.
#[derive(Args, Clone)]
pub struct PatchArgs {
    /// Patch declaration file
    #[arg(long)]
    pub patches: Option<PathBuf>,

    /// Classpath entry (directory or jar) consulted for required classes
    #[arg(long = "classpath", value_name = "DIR|JAR")]
    pub classpath: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub patch: PatchArgs,

    #[command(flatten)]
    pub module: ModuleArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct WeaveArgs {
    /// Host class in JSON form
    pub input: PathBuf,

    /// Write the woven class here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub patch: PatchArgs,

    #[command(flatten)]
    pub module: ModuleArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
