//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use jarplan::Variant;

/// jarplan - build planning for JVM library modules
#[derive(Parser)]
#[command(name = "jarplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to JarPlan.toml (defaults to searching from the current directory)
    #[arg(long, global = true)]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub color: bool,
    pub manifest_path: Option<PathBuf>,
}

impl Cli {
    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            color: !self.no_color,
            manifest_path: self.manifest_path.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan every module and print the plan as JSON
    Plan(PlanArgs),

    /// List the declared dependencies of a module
    Deps(DepsArgs),

    /// Print the compile classpath of a module
    Classpath(ClasspathArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Only plan this variant (host or device)
    #[arg(long)]
    pub variant: Option<Variant>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Module name
    pub module: String,

    /// Variant to inspect (host or device)
    #[arg(long, default_value = "device")]
    pub variant: Variant,
}

#[derive(Args)]
pub struct ClasspathArgs {
    /// Module name
    pub module: String,

    /// Variant to inspect (host or device)
    #[arg(long, default_value = "device")]
    pub variant: Variant,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
