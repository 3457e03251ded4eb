//! # Subprocess Execution
//!
//! Launching and polling the external VCS clients.
//!
//! The orchestration layer never blocks on a child process. [`CommandHost`]
//! starts commands; the returned [`CommandHandle`] is polled for completion
//! (or terminated when a deadline passes) by the runner's cooperative loop.
//! Both are traits so tests can substitute scripted fakes for real processes.
//!
//! [`SystemHost`] is the production implementation over `std::process`. Pipe
//! reads are the one place threads appear: stdout and stderr are drained by
//! two background reader threads per child so a chatty process can never
//! deadlock on a full pipe while the poll loop waits for it to exit.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};

/// Default spacing between completion checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Everything a finished (or failed-to-finish) command produced.
///
/// Launch failures are represented here too, via `errno`, so that one report
/// shape covers "ran and exited", "was killed", and "never started".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub stdout: String,
    pub stderr: String,
    /// OS error code when the process could not be started or waited on.
    pub errno: Option<i32>,
    /// Exit status; `None` when killed by a signal or never started.
    pub status: Option<i32>,
}

impl Outcome {
    /// True when the command started, ran, and exited zero.
    pub fn success(&self) -> bool {
        self.errno.is_none() && self.status == Some(0)
    }

    /// Outcome for a command that could not be started at all.
    pub fn from_launch_error(err: &std::io::Error) -> Self {
        Outcome {
            stderr: err.to_string(),
            errno: err.raw_os_error().or(Some(-1)),
            ..Outcome::default()
        }
    }
}

/// A running command that can be polled or terminated.
pub trait CommandHandle {
    /// Non-blocking completion check. Returns the outcome once the process
    /// has exited; `Some` results are stable across repeated calls.
    fn poll(&mut self) -> Option<Outcome>;

    /// Forcibly terminate the process and collect whatever it produced.
    fn terminate(&mut self) -> Outcome;
}

/// Launches external commands. The single seam between orchestration and the
/// operating system.
pub trait CommandHost {
    fn launch(&self, tool: &str, dir: &Path, args: &[String]) -> Result<Box<dyn CommandHandle>>;
}

/// Production [`CommandHost`] backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl CommandHost for SystemHost {
    fn launch(&self, tool: &str, dir: &Path, args: &[String]) -> Result<Box<dyn CommandHandle>> {
        debug!("launching {} {:?} in {}", tool, args, dir.display());
        let mut child = Command::new(tool)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Launch {
                tool: tool.to_string(),
                message: e.to_string(),
            })?;
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);
        Ok(Box::new(SystemHandle {
            child,
            stdout,
            stderr,
            outcome: None,
        }))
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

struct SystemHandle {
    child: Child,
    stdout: Option<JoinHandle<Vec<u8>>>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    outcome: Option<Outcome>,
}

impl SystemHandle {
    fn finish(&mut self, status: Option<i32>, errno: Option<i32>) -> Outcome {
        let outcome = Outcome {
            stdout: drain(self.stdout.take()),
            stderr: drain(self.stderr.take()),
            errno,
            status,
        };
        self.outcome = Some(outcome.clone());
        outcome
    }
}

fn drain(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

impl CommandHandle for SystemHandle {
    fn poll(&mut self) -> Option<Outcome> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }
        match self.child.try_wait() {
            Ok(Some(status)) => Some(self.finish(status.code(), None)),
            Ok(None) => None,
            Err(e) => Some(self.finish(None, e.raw_os_error().or(Some(-1)))),
        }
    }

    fn terminate(&mut self) -> Outcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => self.finish(status.code(), None),
            Err(e) => self.finish(None, e.raw_os_error().or(Some(-1))),
        }
    }
}

/// Drive a single command to completion with a hard deadline.
///
/// Polls every `interval` until the command exits; once `timeout` elapses the
/// process is terminated and a timeout error is returned. `on_tick` runs once
/// per poll so callers can refresh status displays.
pub fn run_to_completion(
    handle: &mut dyn CommandHandle,
    op: &str,
    dir: &Path,
    timeout: Duration,
    interval: Duration,
    mut on_tick: impl FnMut(),
) -> Result<Outcome> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(outcome) = handle.poll() {
            return Ok(outcome);
        }
        if Instant::now() >= deadline {
            handle.terminate();
            return Err(Error::Timeout {
                op: op.to_string(),
                dir: dir.display().to_string(),
                seconds: timeout.as_secs(),
            });
        }
        on_tick();
        thread::sleep(interval);
    }
}
