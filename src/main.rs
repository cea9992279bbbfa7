// Copyright 2026 Shutter Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, unused_imports)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod capture;
mod cli;
mod config;
mod devices;
mod keys;
mod report;
mod runner;
mod sanitize;
mod session;
mod targets;
mod uploader;

#[derive(Parser)]
#[command(
    name = "shutter",
    about = "Shutter: batch screenshot agent for tracked URL sets",
    version,
    after_help = "Run 'shutter <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture every tracked URL across all device profiles
    Run {
        /// Number of targets to capture in parallel
        #[arg(long, default_value = "1")]
        concurrency: usize,
    },
    /// List the tracked capture targets
    Targets,
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { concurrency } => {
            cli::run_cmd::run(concurrency, cli.verbose, cli.quiet).await
        }
        Commands::Targets => cli::targets_cmd::run(cli.json).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shutter", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli.quiet && !cli.json {
            eprintln!("  Error: {e:#}");
        }
        if cli.json {
            println!(
                "{}",
                serde_json::json!({ "error": true, "message": format!("{e:#}") })
            );
        }
        std::process::exit(1);
    }

    result
}
