//! # vcs-batch CLI
//!
//! Binary entry point for the `vcs-batch` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate subcommand.
//! - Handling top-level application errors and translating them into
//!   user-friendly output.
//!
//! The core logic lives in the `vcs_batch` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
