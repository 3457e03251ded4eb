//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// vcs-batch - Run batched svn/cvs/p4 commands over a selection of paths
#[derive(Parser, Debug)]
#[command(name = "vcs-batch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a VCS operation over the selected paths
    Run(commands::run::RunArgs),

    /// Show the invocations an operation would produce, without running them
    Plan(commands::plan::PlanArgs),

    /// Show working-copy metadata for the given paths
    Info(commands::info::InfoArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = vcs_batch::output::OutputConfig::detect(Some(self.color.as_str()));

        match self.command {
            Commands::Run(args) => commands::run::execute(args, output),
            Commands::Plan(args) => commands::plan::execute(args),
            Commands::Info(args) => commands::info::execute(args, output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Warn);
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .format_timestamp(None)
        .init();
}
