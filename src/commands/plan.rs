//! Plan command implementation
//!
//! A dry run of the batcher: shows which directory each invocation would run
//! in and with which arguments, without launching anything. Useful for
//! checking how a selection will be grouped before committing to it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use vcs_batch::batch::group_paths;
use vcs_batch::config::Config;
use vcs_batch::exec::SystemHost;
use vcs_batch::ops::{base_args, Op, OpContext};
use vcs_batch::runner::Runner;

use super::VcsChoice;

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Operation to plan for
    #[arg(value_enum)]
    pub op: Op,

    /// Files and directories to operate on
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Version control system (detected from the paths by default)
    #[arg(long, value_enum, default_value_t = VcsChoice::Auto)]
    pub vcs: VcsChoice,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "VCS_BATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Execute the plan command
pub fn execute(args: PlanArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let vcs = args.vcs.resolve(&args.paths)?;

    let host = SystemHost;
    let runner = Runner::new(&config, &host);
    let probe = runner.probe(vcs);

    let base = base_args(vcs, args.op, &config, &OpContext::default())?;
    let groups = group_paths(probe.as_ref(), &args.paths, args.op.prune())?;

    if groups.is_empty() {
        println!(
            "nothing to do: no path is under {} control",
            vcs.label()
        );
        return Ok(());
    }

    let tool = vcs.command(&config);
    for (dir, rel_args) in groups {
        let mut full = base.clone();
        full.extend(rel_args.into_iter().filter(|arg| !arg.is_empty()));
        println!("{}$ {} {}", dir.display(), tool, full.join(" "));
    }
    Ok(())
}
