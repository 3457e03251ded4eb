//! Perforce metadata.
//!
//! Perforce keeps no per-directory control files; everything is asked of the
//! `p4` client. `p4 fstat <path>` prints one `... key value` line per field
//! for files the server knows about. Because a probe call here means a
//! subprocess round-trip, results are memoized for a short interval so a
//! burst of lookups during batching reuses one `fstat` per path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::{Entry, EntryKind, MetadataProbe, RepoRoot};
use crate::exec::{run_to_completion, CommandHost};

/// How long one fstat answer stays fresh.
const CACHE_TTL: Duration = Duration::from_millis(500);

/// Deadline for a single metadata query; a hung `p4` must not stall the
/// batcher.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Metadata probe backed by the `p4` command-line client.
pub struct PerforceProbe<'a> {
    host: &'a dyn CommandHost,
    command: String,
    cache: RefCell<HashMap<PathBuf, CacheSlot>>,
}

struct CacheSlot {
    at: Instant,
    entry: Entry,
}

impl<'a> PerforceProbe<'a> {
    pub fn new(host: &'a dyn CommandHost, command: &str) -> Self {
        PerforceProbe {
            host,
            command: command.to_string(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn fstat(&self, path: &Path) -> Entry {
        let now = Instant::now();
        if let Some(slot) = self.cache.borrow().get(path) {
            if now.duration_since(slot.at) < CACHE_TTL {
                return slot.entry.clone();
            }
        }
        let entry = self.fstat_uncached(path);
        self.cache.borrow_mut().insert(
            path.to_path_buf(),
            CacheSlot {
                at: now,
                entry: entry.clone(),
            },
        );
        entry
    }

    fn fstat_uncached(&self, path: &Path) -> Entry {
        let dir = if path.is_dir() {
            path
        } else {
            match path.parent() {
                Some(parent) => parent,
                None => return Entry::missing(),
            }
        };
        let args = vec!["fstat".to_string(), path.display().to_string()];
        let Ok(mut handle) = self.host.launch(&self.command, dir, &args) else {
            return Entry::missing();
        };
        match run_to_completion(
            &mut *handle,
            "fstat",
            dir,
            PROBE_TIMEOUT,
            PROBE_POLL_INTERVAL,
            || {},
        ) {
            Ok(outcome) if outcome.success() => parse_fstat(&outcome.stdout),
            _ => Entry::missing(),
        }
    }
}

impl MetadataProbe for PerforceProbe<'_> {
    fn entry(&self, path: &Path) -> Entry {
        self.fstat(path)
    }

    // Perforce has no control directories, so the batcher never collapses
    // whole-directory selections for it.
    fn control_dir(&self, _dir: &Path) -> Option<PathBuf> {
        None
    }

    fn root(&self, path: &Path) -> Option<RepoRoot> {
        let entry = self.fstat(path);
        let depot = depot_prefix(entry.url.as_deref()?)?;
        Some(RepoRoot {
            id: depot,
            protocol: "p4".to_string(),
        })
    }
}

/// Parse `p4 fstat` output into an [`Entry`].
///
/// Output is one `... key value` line per field; files unknown to the server
/// produce error text with no `...` lines at all.
pub fn parse_fstat(output: &str) -> Entry {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for line in output.lines() {
        let Some(rest) = line.strip_prefix("... ") else {
            continue;
        };
        match rest.split_once(' ') {
            Some((key, value)) => fields.insert(key, value.trim()),
            None => fields.insert(rest.trim(), ""),
        };
    }
    if !fields.contains_key("depotFile") {
        return Entry::missing();
    }
    let get = |key: &str| {
        fields
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    };
    Entry {
        revision: get("headRev"),
        date: get("headTime"),
        kind: Some(EntryKind::File),
        author: None,
        url: get("depotFile"),
        exists: true,
    }
}

/// Depot prefix of a depot path: `//depot/main/a.py` -> `//depot`.
pub fn depot_prefix(depot_file: &str) -> Option<String> {
    let rest = depot_file.strip_prefix("//")?;
    let depot = rest.split('/').next().filter(|s| !s.is_empty())?;
    Some(format!("//{}", depot))
}
