//! Run command implementation
//!
//! Resolves the VCS, batches the selected paths, launches the client
//! commands, and prints one report block per invocation. The process exit
//! status reflects the worst command result.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Args;

use vcs_batch::config::Config;
use vcs_batch::exec::SystemHost;
use vcs_batch::ops::Op;
use vcs_batch::output::{NullStatus, OutputConfig, TermStatus};
use vcs_batch::report;
use vcs_batch::runner::Runner;

use super::VcsChoice;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Operation to perform
    #[arg(value_enum)]
    pub op: Op,

    /// Files and directories to operate on
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Version control system (detected from the paths by default)
    #[arg(long, value_enum, default_value_t = VcsChoice::Auto)]
    pub vcs: VcsChoice,

    /// Log message (required for commit)
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Username for manual authentication mode
    #[arg(long, value_name = "NAME", env = "VCS_BATCH_USERNAME")]
    pub username: Option<String>,

    /// Password for manual authentication mode
    #[arg(long, value_name = "PASS", env = "VCS_BATCH_PASSWORD")]
    pub password: Option<String>,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "VCS_BATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the per-command timeout, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Suppress the transient status line
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs, output: OutputConfig) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let vcs = args.vcs.resolve(&args.paths)?;
    if args.op.needs_message() && args.message.is_none() {
        bail!("{} requires a log message; pass -m <TEXT>", args.op.name());
    }

    let host = SystemHost;
    let mut runner = Runner::new(&config, &host);
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        runner.credentials_mut().set_fallback(username, password);
    }

    let message = args.message.as_deref();
    let reports = if args.quiet {
        runner.execute(vcs, args.op, &args.paths, message, &mut NullStatus)?
    } else {
        let mut sink = TermStatus::stderr();
        runner.execute(vcs, args.op, &args.paths, message, &mut sink)?
    };
    if reports.is_empty() {
        bail!("none of the given paths are under {} control", vcs.label());
    }

    let tool = vcs.command(&config);
    let mut failures = 0;
    for report in &reports {
        print!("{}", report::render(tool, report));
        if !report.success() {
            failures += 1;
        }
    }

    if failures > 0 {
        Err(anyhow!(
            "{}",
            output.emoji(
                "❌",
                &format!("{} of {} command(s) failed", failures, reports.len())
            )
        ))
    } else {
        println!(
            "{}",
            output.emoji(
                "✅",
                &format!("{} {} finished", reports.len(), args.op.name())
            )
        );
        Ok(())
    }
}
