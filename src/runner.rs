//! # Command Orchestration
//!
//! Gluing the pieces together: batch the selected paths, synthesize the
//! client invocation per group, launch everything, and drive one cooperative
//! poll loop until every command has finished, timed out, or been cancelled.
//!
//! [`Runner`] holds the long-lived state (configuration, the command host,
//! cached credentials). [`Runner::start`] performs the pre-flight checks and
//! launches, returning a [`Batch`] that owns the in-flight handles; callers
//! either drain it with [`Batch::wait`] or drive [`Batch::poll`] themselves.
//! Commands that exit nonzero are not errors: every launched command yields a
//! [`CommandReport`], and only pre-flight problems (unsupported operation,
//! missing ssh-agent, unreadable configuration) abort the batch as a whole.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::batch::group_paths;
use crate::config::{AuthMode, Config};
use crate::error::{Error, Result};
use crate::exec::{run_to_completion, CommandHost, Outcome};
use crate::ops::{base_args, Op, OpContext, VcsKind};
use crate::output::StatusSink;
use crate::path::normalize;
use crate::pending::PendingCommands;
use crate::probe::{collect_roots, CvsProbe, MetadataProbe, PerforceProbe, SvnProbe};

/// Deadline for the ssh-agent liveness check.
const SSH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

/// What one launched command came to.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub vcs: VcsKind,
    pub op: Op,
    /// Directory the command ran in.
    pub dir: PathBuf,
    /// Full argument vector, relative paths included.
    pub args: Vec<String>,
    pub outcome: Outcome,
    /// The command blew its deadline and was terminated.
    pub timed_out: bool,
    /// Advice derived from recognizable failure output.
    pub hint: Option<String>,
}

impl CommandReport {
    pub fn success(&self) -> bool {
        !self.timed_out && self.outcome.success()
    }
}

/// Credentials for manual authentication mode, keyed by repository identity.
#[derive(Debug, Default)]
pub struct CredentialCache {
    by_host: HashMap<String, (String, String)>,
    /// Used when no per-host entry matches.
    fallback: Option<(String, String)>,
}

impl CredentialCache {
    pub fn insert(&mut self, host: &str, username: &str, password: &str) {
        self.by_host
            .insert(host.to_string(), (username.to_string(), password.to_string()));
    }

    pub fn set_fallback(&mut self, username: &str, password: &str) {
        self.fallback = Some((username.to_string(), password.to_string()));
    }

    pub fn get(&self, host: &str) -> Option<(&str, &str)> {
        self.by_host
            .get(host)
            .or(self.fallback.as_ref())
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }
}

/// Long-lived orchestration state.
pub struct Runner<'a> {
    config: &'a Config,
    host: &'a dyn CommandHost,
    credentials: CredentialCache,
    next_id: u64,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a Config, host: &'a dyn CommandHost) -> Self {
        Runner {
            config,
            host,
            credentials: CredentialCache::default(),
            next_id: 1,
        }
    }

    pub fn credentials_mut(&mut self) -> &mut CredentialCache {
        &mut self.credentials
    }

    /// The metadata probe for a VCS.
    pub fn probe(&self, vcs: VcsKind) -> Box<dyn MetadataProbe + 'a> {
        match vcs {
            VcsKind::Svn => Box::new(SvnProbe),
            VcsKind::Cvs => Box::new(CvsProbe),
            VcsKind::Perforce => {
                Box::new(PerforceProbe::new(self.host, &self.config.p4_command))
            }
        }
    }

    /// Run an operation over a selection and wait for all of it.
    pub fn execute(
        &mut self,
        vcs: VcsKind,
        op: Op,
        paths: &[PathBuf],
        message: Option<&str>,
        sink: &mut dyn StatusSink,
    ) -> Result<Vec<CommandReport>> {
        let batch = self.start(vcs, op, paths, message)?;
        Ok(batch.wait(sink))
    }

    /// Pre-flight, group, and launch; the caller drives the returned batch.
    pub fn start(
        &mut self,
        vcs: VcsKind,
        op: Op,
        paths: &[PathBuf],
        message: Option<&str>,
    ) -> Result<Batch> {
        let normalized: Vec<PathBuf> = paths
            .iter()
            .map(|p| normalize(p))
            .collect::<Result<_>>()?;

        let probe = self.probe(vcs);
        let (root_ids, protocols) = collect_roots(probe.as_ref(), &normalized);

        if op.remote() && self.config.check_ssh_agent && uses_ssh(&protocols) {
            self.check_ssh_agent()?;
        }

        // diff-recent needs the current revision of the target to name the
        // range; taken from the first selection, which is what the range is
        // about.
        let revision = if op == Op::DiffRecent {
            normalized
                .first()
                .and_then(|path| probe.entry(path).revision)
        } else {
            None
        };

        let credentials = if vcs == VcsKind::Svn
            && op.remote()
            && self.config.auth_mode == AuthMode::Manual
        {
            root_ids
                .iter()
                .find_map(|id| self.credentials.get(id))
                .map(|(u, p)| (u.to_string(), p.to_string()))
        } else {
            None
        };

        let ctx = OpContext {
            message,
            revision: revision.as_deref(),
            credentials: credentials.as_ref().map(|(u, p)| (u.as_str(), p.as_str())),
        };
        let base = base_args(vcs, op, self.config, &ctx)?;
        let tool = vcs.command(self.config).to_string();

        let groups = group_paths(probe.as_ref(), &normalized, op.prune())?;

        let mut batch = Batch::new(vcs, op, self.config);
        for (dir, rel_args) in groups {
            let mut args = base.clone();
            // An empty relative argument means "the directory itself", which
            // is the working directory already.
            args.extend(rel_args.into_iter().filter(|arg| !arg.is_empty()));

            let id = self.next_id;
            self.next_id += 1;
            match self.host.launch(&tool, &dir, &args) {
                Ok(handle) => batch.admit(id, dir, args, handle),
                Err(Error::Launch { message, .. }) => {
                    warn!("cannot launch {} in {}: {}", tool, dir.display(), message);
                    batch.reports.push(CommandReport {
                        vcs,
                        op,
                        dir,
                        args,
                        outcome: Outcome {
                            stderr: message,
                            errno: Some(-1),
                            ..Outcome::default()
                        },
                        timed_out: false,
                        hint: None,
                    });
                }
                Err(other) => return Err(other),
            }
        }
        debug!(
            "{} {}: {} command(s) in flight",
            vcs.label(),
            op.name(),
            batch.inflight.len()
        );
        Ok(batch)
    }

    /// Verify a live ssh-agent with at least one loaded identity.
    ///
    /// Without one, an ssh-tunneled client invocation hangs on a password
    /// prompt it has no terminal to show.
    fn check_ssh_agent(&self) -> Result<()> {
        // Windows agents (pageant) raise their own prompts.
        if cfg!(windows) {
            return Ok(());
        }
        let no_agent = || Error::SshAgent {
            message: "no ssh-agent with a loaded identity was found, so this \
                      remote operation would hang on a password prompt. Run \
                      ssh-add, or set check_ssh_agent: false to skip this check."
                .to_string(),
        };
        let args = vec!["-l".to_string()];
        let mut handle = self
            .host
            .launch("ssh-add", Path::new("."), &args)
            .map_err(|_| no_agent())?;
        let outcome = run_to_completion(
            &mut *handle,
            "ssh-add",
            Path::new("."),
            SSH_CHECK_TIMEOUT,
            Duration::from_millis(10),
            || {},
        )
        .map_err(|_| no_agent())?;

        let text = format!("{}{}", outcome.stdout, outcome.stderr);
        if text.trim().is_empty() || text.contains("no identities") || text.contains("not open") {
            Err(no_agent())
        } else {
            Ok(())
        }
    }
}

fn uses_ssh(protocols: &std::collections::BTreeSet<String>) -> bool {
    protocols
        .iter()
        .any(|protocol| protocol.contains("ssh") || protocol == "ext")
}

struct InFlight {
    id: u64,
    dir: PathBuf,
    args: Vec<String>,
    handle: Box<dyn crate::exec::CommandHandle>,
    deadline: Instant,
}

enum Disposition {
    Running,
    Done(Outcome),
    TimedOut,
}

/// A set of launched commands being driven to completion.
pub struct Batch {
    vcs: VcsKind,
    op: Op,
    timeout: Duration,
    interval: Duration,
    inflight: Vec<InFlight>,
    reports: Vec<CommandReport>,
    pending: PendingCommands,
}

impl Batch {
    fn new(vcs: VcsKind, op: Op, config: &Config) -> Self {
        Batch {
            vcs,
            op,
            timeout: config.timeout(),
            interval: config.poll_interval(),
            inflight: Vec::new(),
            reports: Vec::new(),
            pending: PendingCommands::new(vcs.label()),
        }
    }

    fn admit(
        &mut self,
        id: u64,
        dir: PathBuf,
        args: Vec<String>,
        handle: Box<dyn crate::exec::CommandHandle>,
    ) {
        self.pending.add(id, self.op.name(), &dir);
        self.inflight.push(InFlight {
            id,
            dir,
            args,
            handle,
            deadline: Instant::now() + self.timeout,
        });
    }

    pub fn is_done(&self) -> bool {
        self.inflight.is_empty()
    }

    /// Operations still in flight, for display.
    pub fn pending_dirs(&self) -> Vec<&Path> {
        self.pending.dirs()
    }

    /// One pass over the in-flight commands: collect completions, terminate
    /// deadline violations, refresh the status line. Returns `true` while
    /// anything is still running; callers re-invoke after the poll interval.
    pub fn poll(&mut self, now: Instant, sink: &mut dyn StatusSink) -> bool {
        let mut i = 0;
        while i < self.inflight.len() {
            let disposition = {
                let cmd = &mut self.inflight[i];
                match cmd.handle.poll() {
                    Some(outcome) => Disposition::Done(outcome),
                    None if now >= cmd.deadline => Disposition::TimedOut,
                    None => Disposition::Running,
                }
            };
            match disposition {
                Disposition::Running => i += 1,
                Disposition::Done(outcome) => {
                    let cmd = self.inflight.remove(i);
                    self.pending.remove(cmd.id);
                    let report = self.make_report(cmd, outcome, false);
                    self.reports.push(report);
                }
                Disposition::TimedOut => {
                    let mut cmd = self.inflight.remove(i);
                    let outcome = cmd.handle.terminate();
                    self.pending.remove(cmd.id);
                    warn!(
                        "{} in {} exceeded {}s; terminated",
                        self.op.name(),
                        cmd.dir.display(),
                        self.timeout.as_secs()
                    );
                    let report = self.make_report(cmd, outcome, true);
                    self.reports.push(report);
                }
            }
        }
        self.pending.tick(now, sink);
        if self.inflight.is_empty() {
            sink.clear_status();
            false
        } else {
            true
        }
    }

    /// Terminate everything still in flight. Cancelled commands produce no
    /// reports. Returns how many were cancelled.
    pub fn cancel(&mut self, sink: &mut dyn StatusSink) -> usize {
        let count = self.inflight.len();
        for mut cmd in self.inflight.drain(..) {
            cmd.handle.terminate();
            self.pending.remove(cmd.id);
        }
        if count > 0 {
            sink.set_status(&format!(
                "Canceled {} {} request(s)",
                count,
                self.vcs.label()
            ));
        }
        count
    }

    /// Drive the batch to completion and return the reports, ordered by
    /// directory.
    pub fn wait(mut self, sink: &mut dyn StatusSink) -> Vec<CommandReport> {
        while self.poll(Instant::now(), sink) {
            thread::sleep(self.interval);
        }
        let mut reports = self.reports;
        reports.sort_by(|a, b| a.dir.cmp(&b.dir));
        reports
    }

    fn make_report(&self, cmd: InFlight, outcome: Outcome, timed_out: bool) -> CommandReport {
        let hint = if timed_out {
            Some(format!(
                "the command was terminated after {}s; raise timeout_secs in the \
                 configuration if it legitimately needs longer",
                self.timeout.as_secs()
            ))
        } else if self.op == Op::Commit
            && (outcome.stderr.contains("up-to-date check failed")
                || outcome.stdout.contains("up-to-date check failed"))
        {
            Some("the working copy is out of date; run update, resolve any conflicts, and retry the commit".to_string())
        } else {
            None
        };
        CommandReport {
            vcs: self.vcs,
            op: self.op,
            dir: cmd.dir,
            args: cmd.args,
            outcome,
            timed_out,
            hint,
        }
    }
}
