//! # Operation Catalog
//!
//! The operations vcs-batch can run and how each VCS client spells them.
//!
//! Per operation this module knows: whether selections may be pruned into
//! whole-directory invocations (everything except `add`, whose targets the
//! client has no record of yet), whether the operation talks to the remote
//! (and therefore may need credentials or a live ssh-agent), and the base
//! argument vector per client. Operations a client has no equivalent for are
//! rejected with [`Error::UnsupportedOperation`] before anything is launched.

use std::path::Path;

use clap::ValueEnum;

use crate::config::{AuthMode, Config};
use crate::error::{Error, Result};
use crate::probe::{CvsProbe, MetadataProbe, SvnProbe};

/// A version-control operation on a selection of paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Op {
    Update,
    Diff,
    /// Diff against the previous committed revision.
    DiffRecent,
    Log,
    Status,
    Add,
    Commit,
    Revert,
    Resolved,
    Blame,
    List,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Update => "update",
            Op::Diff => "diff",
            Op::DiffRecent => "diff-recent",
            Op::Log => "log",
            Op::Status => "status",
            Op::Add => "add",
            Op::Commit => "commit",
            Op::Revert => "revert",
            Op::Resolved => "resolved",
            Op::Blame => "blame",
            Op::List => "list",
        }
    }

    /// Whether selections may be collapsed and regrouped. `add` targets are
    /// unknown to the client, so every explicit path must be kept.
    pub fn prune(&self) -> bool {
        !matches!(self, Op::Add)
    }

    /// Whether the operation contacts the repository (and so may trigger
    /// authentication).
    pub fn remote(&self) -> bool {
        matches!(self, Op::Update | Op::Commit | Op::Log | Op::Blame | Op::List)
    }

    /// Whether a diff-shaped result is expected, where empty output means
    /// "no differences" rather than nothing to say.
    pub fn is_diff(&self) -> bool {
        matches!(self, Op::Diff | Op::DiffRecent)
    }

    pub fn needs_message(&self) -> bool {
        matches!(self, Op::Commit)
    }
}

/// The supported version control systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VcsKind {
    Svn,
    Cvs,
    #[value(name = "p4")]
    Perforce,
}

impl VcsKind {
    pub fn label(&self) -> &'static str {
        match self {
            VcsKind::Svn => "SVN",
            VcsKind::Cvs => "CVS",
            VcsKind::Perforce => "Perforce",
        }
    }

    /// The configured client executable.
    pub fn command<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            VcsKind::Svn => &config.svn_command,
            VcsKind::Cvs => &config.cvs_command,
            VcsKind::Perforce => &config.p4_command,
        }
    }

    /// Detect the VCS owning `path` from control directories on disk.
    ///
    /// Perforce keeps no on-disk markers and must be selected explicitly.
    pub fn detect(path: &Path) -> Option<VcsKind> {
        let dir = if path.is_dir() { path } else { path.parent()? };
        if SvnProbe.control_dir(dir).is_some() {
            Some(VcsKind::Svn)
        } else if CvsProbe.control_dir(dir).is_some() {
            Some(VcsKind::Cvs)
        } else {
            None
        }
    }
}

/// Everything argument synthesis may need beyond the operation itself.
#[derive(Debug, Default)]
pub struct OpContext<'a> {
    /// Commit log message.
    pub message: Option<&'a str>,
    /// Current committed revision of the target, for `diff-recent`.
    pub revision: Option<&'a str>,
    /// Explicit credentials (SVN manual auth mode only).
    pub credentials: Option<(&'a str, &'a str)>,
}

/// Base argument vector for one invocation, before the relative paths are
/// appended.
pub fn base_args(vcs: VcsKind, op: Op, config: &Config, ctx: &OpContext) -> Result<Vec<String>> {
    match vcs {
        VcsKind::Svn => svn_args(op, config, ctx),
        VcsKind::Cvs => cvs_args(op, config, ctx),
        VcsKind::Perforce => p4_args(op, ctx),
    }
}

fn unsupported(op: Op, vcs: VcsKind) -> Error {
    Error::UnsupportedOperation {
        op: op.name().to_string(),
        vcs: vcs.label().to_string(),
    }
}

fn svn_args(op: Op, config: &Config, ctx: &OpContext) -> Result<Vec<String>> {
    let mut args: Vec<String> = match op {
        Op::Update => vec!["update".into()],
        Op::Diff => vec!["diff".into()],
        Op::DiffRecent => {
            let (prev, cur) = diff_recent_revisions(VcsKind::Svn, ctx)?;
            vec!["diff".into(), format!("-r{}:{}", prev, cur)]
        }
        Op::Log => vec!["log".into()],
        Op::Status => vec!["status".into(), "-v".into()],
        Op::Add => vec!["add".into()],
        Op::Commit => {
            let message = ctx.message.unwrap_or_default();
            vec!["commit".into(), "-m".into(), message.into()]
        }
        Op::Revert => vec!["revert".into()],
        Op::Resolved => vec!["resolved".into()],
        Op::Blame => vec!["blame".into()],
        Op::List => vec!["list".into()],
    };

    // Never let the client stop to prompt; failures surface in the report
    // instead.
    if op.remote() || op.is_diff() {
        args.push("--non-interactive".into());
    }
    if op.remote() && config.auth_mode == AuthMode::Manual {
        if let Some((username, password)) = ctx.credentials {
            args.push("--username".into());
            args.push(username.into());
            args.push("--password".into());
            args.push(password.into());
            args.push("--no-auth-cache".into());
        }
    }
    Ok(args)
}

fn cvs_args(op: Op, config: &Config, ctx: &OpContext) -> Result<Vec<String>> {
    // Compress remote traffic; harmless for local roots.
    let mut args: Vec<String> = vec!["-z5".into()];
    match op {
        Op::Update => args.extend(["update".into(), "-d".into(), "-P".into()]),
        Op::Diff => {
            args.push("diff".into());
            if let Some(flag) = config.diff_style.cvs_flag() {
                args.push(flag.into());
            }
        }
        Op::DiffRecent => {
            let (prev, cur) = diff_recent_revisions(VcsKind::Cvs, ctx)?;
            args.push("diff".into());
            if let Some(flag) = config.diff_style.cvs_flag() {
                args.push(flag.into());
            }
            args.extend(["-r".into(), prev, "-r".into(), cur]);
        }
        Op::Log => args.push("log".into()),
        Op::Status => args.push("status".into()),
        Op::Add => args.push("add".into()),
        Op::Commit => {
            let message = ctx.message.unwrap_or_default();
            args.extend(["commit".into(), "-m".into(), message.into()]);
        }
        Op::Revert | Op::Resolved | Op::Blame | Op::List => {
            return Err(unsupported(op, VcsKind::Cvs));
        }
    }
    Ok(args)
}

fn p4_args(op: Op, ctx: &OpContext) -> Result<Vec<String>> {
    let args: Vec<String> = match op {
        Op::Update => vec!["sync".into()],
        Op::Diff => vec!["diff".into()],
        Op::Log => vec!["filelog".into()],
        Op::Status => vec!["fstat".into()],
        Op::Add => vec!["add".into()],
        Op::Commit => {
            let message = ctx.message.unwrap_or_default();
            vec!["submit".into(), "-d".into(), message.into()]
        }
        Op::Revert => vec!["revert".into()],
        Op::Blame => vec!["annotate".into(), "-q".into()],
        Op::DiffRecent | Op::Resolved | Op::List => {
            return Err(unsupported(op, VcsKind::Perforce));
        }
    };
    Ok(args)
}

/// Previous and current revision strings for a `diff-recent`, derived from
/// the probe-reported current revision.
fn diff_recent_revisions(vcs: VcsKind, ctx: &OpContext) -> Result<(String, String)> {
    let current = ctx.revision.ok_or_else(|| Error::UnsupportedOperation {
        op: "diff-recent on a path with no recorded revision".to_string(),
        vcs: vcs.label().to_string(),
    })?;
    let previous = previous_revision(vcs, current).ok_or_else(|| Error::UnsupportedOperation {
        op: format!("diff-recent at revision {}", current),
        vcs: vcs.label().to_string(),
    })?;
    Ok((previous, current.to_string()))
}

/// Compute the revision immediately before `current`, per each system's
/// numbering scheme. `None` when there is no earlier revision.
pub fn previous_revision(vcs: VcsKind, current: &str) -> Option<String> {
    match vcs {
        // Plain integers, first revision is 1
        VcsKind::Svn => {
            let rev: u64 = current.parse().ok()?;
            (rev > 1).then(|| (rev - 1).to_string())
        }
        // Dotted numbers; decrement the last component (1.5 -> 1.4)
        VcsKind::Cvs => {
            let (stem, last) = current.rsplit_once('.')?;
            let minor: u64 = last.parse().ok()?;
            (minor > 1).then(|| format!("{}.{}", stem, minor - 1))
        }
        VcsKind::Perforce => None,
    }
}
