//! jarplan CLI - build planning for JVM library modules

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("jarplan=debug")
    } else {
        EnvFilter::new("jarplan=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = cli.global();

    // Execute command
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(&global, args),
        Commands::Deps(args) => commands::deps::execute(&global, args),
        Commands::Classpath(args) => commands::classpath::execute(&global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
