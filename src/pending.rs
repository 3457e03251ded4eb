//! # Pending-Command Registry
//!
//! Bookkeeping for commands that have been launched but not yet finished,
//! plus the throttled one-line status display derived from them.
//!
//! The registry is ordinary owned state inside the runner, updated from its
//! poll loop: commands are added at launch, removed on completion, and
//! [`PendingCommands::tick`] is called once per poll with the current time.
//! Ticks refresh the status line at most once per second. The line shows the
//! operation name while a single command runs, or a count when several are in
//! flight, followed by a growing trail of stars (wrapping at forty) so the
//! user can see the loop is alive even when nothing completes.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::output::StatusSink;

/// Status updates are spaced at least this far apart.
const UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// The star trail wraps back to one after this many ticks.
const MAX_STARS: u32 = 40;

#[derive(Debug, Clone)]
struct Pending {
    id: u64,
    op: String,
    dir: PathBuf,
}

/// Registry of in-flight commands for one batch.
#[derive(Debug)]
pub struct PendingCommands {
    /// Display label, e.g. the VCS name.
    label: String,
    entries: Vec<Pending>,
    stars: u32,
    last_update: Option<Instant>,
}

impl PendingCommands {
    pub fn new(label: &str) -> Self {
        PendingCommands {
            label: label.to_string(),
            entries: Vec::new(),
            stars: 0,
            last_update: None,
        }
    }

    /// Register a launched command under a caller-chosen id.
    pub fn add(&mut self, id: u64, op: &str, dir: &Path) {
        if self.entries.is_empty() {
            // A fresh batch restarts the star trail and updates promptly.
            self.stars = 0;
            self.last_update = None;
        }
        self.entries.push(Pending {
            id,
            op: op.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    /// Remove a finished (or cancelled) command. Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub fn ids(&self) -> Vec<u64> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directories with commands still in flight.
    pub fn dirs(&self) -> Vec<&Path> {
        self.entries.iter().map(|entry| entry.dir.as_path()).collect()
    }

    /// Refresh the status line if at least a second has passed.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn StatusSink) {
        if self.entries.is_empty() {
            return;
        }
        let due = self
            .last_update
            .map_or(true, |at| now.duration_since(at) >= UPDATE_INTERVAL);
        if !due {
            return;
        }
        self.last_update = Some(now);
        self.stars += 1;
        if self.stars > MAX_STARS {
            self.stars = 1;
        }
        sink.set_status(&self.status_line());
    }

    fn status_line(&self) -> String {
        let what = if self.entries.len() == 1 {
            title_case(&self.entries[0].op)
        } else {
            format!("({} cmds)", self.entries.len())
        };
        format!(
            "{} {} {}",
            self.label,
            what,
            "*".repeat(self.stars as usize)
        )
    }
}

/// Upper-case the first character: `update` -> `Update`.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
