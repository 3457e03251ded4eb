//! # Info Command Implementation
//!
//! This module implements the `info` subcommand, which displays the
//! working-copy metadata the probes can read for each given path: revision,
//! last-commit date, kind, author, remote URL, and the repository identity
//! used for grouping.
//!
//! This command is a safe, read-only operation that does not modify any
//! files (for Perforce it shells out to `p4 fstat`, which is itself
//! read-only).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use vcs_batch::config::Config;
use vcs_batch::exec::SystemHost;
use vcs_batch::output::OutputConfig;
use vcs_batch::path::normalize;
use vcs_batch::probe::MetadataProbe;
use vcs_batch::runner::Runner;

use super::VcsChoice;

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Files and directories to inspect
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Version control system (detected from the paths by default)
    #[arg(long, value_enum, default_value_t = VcsChoice::Auto)]
    pub vcs: VcsChoice,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "VCS_BATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Execute the `info` command.
pub fn execute(args: InfoArgs, output: OutputConfig) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let vcs = args.vcs.resolve(&args.paths)?;

    let host = SystemHost;
    let runner = Runner::new(&config, &host);
    let probe = runner.probe(vcs);

    for path in &args.paths {
        let path = normalize(path)?;
        println!("{}", output.emoji("📄", &path.display().to_string()));
        display_entry(probe.as_ref(), &path, vcs.label());
    }
    Ok(())
}

fn display_entry(probe: &dyn MetadataProbe, path: &std::path::Path, label: &str) {
    let entry = probe.entry(path);
    if !entry.exists {
        println!("   not under {} control", label);
        return;
    }
    if !entry.versioned() {
        println!("   inside a {} checkout, but not added", label);
        return;
    }

    let show = |name: &str, value: &Option<String>| {
        if let Some(value) = value {
            println!("   {:<9} {}", format!("{}:", name), value);
        }
    };
    show("Revision", &entry.revision);
    show("Date", &entry.date);
    show(
        "Kind",
        &entry.kind.map(|kind| kind.as_str().to_string()),
    );
    show("Author", &entry.author);
    show("URL", &entry.url);

    if let Some(root) = probe.root(path) {
        println!("   Root:     {} (protocol {})", root.id, root.protocol);
    }
}
