//! CVS working-copy metadata.
//!
//! Every CVS-managed directory contains a `CVS` control directory with two
//! files of interest here: `Entries`, one slash-delimited line per child
//! (`D/name////` for subdirectories, `/name/rev/date/flags/ignore` for
//! files), and `Root`, whose first line names the repository the directory
//! was checked out from (`:pserver:user@host:/cvsroot` or a plain local
//! path). The `Root` line doubles as the repository identity for grouping.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Entry, EntryKind, MetadataProbe, RepoRoot};

/// Metadata probe for CVS working copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct CvsProbe;

impl CvsProbe {
    pub fn new() -> Self {
        CvsProbe
    }
}

impl MetadataProbe for CvsProbe {
    fn entry(&self, path: &Path) -> Entry {
        // Items are listed in the Entries file of their containing directory.
        let Some(parent) = path.parent() else {
            return Entry::missing();
        };
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Entry::missing();
        };
        read_entry(parent, &name)
    }

    fn control_dir(&self, dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join("CVS");
        if candidate.is_dir() {
            Some(candidate)
        } else {
            None
        }
    }

    fn root(&self, path: &Path) -> Option<RepoRoot> {
        let dir = if path.is_dir() { path } else { path.parent()? };
        let line = read_root_line(dir)?;
        Some(parse_root(&line))
    }
}

fn read_entry(dir: &Path, name: &str) -> Entry {
    let entries_file = dir.join("CVS").join("Entries");
    let Ok(raw) = fs::read(&entries_file) else {
        return Entry::missing();
    };
    let content = String::from_utf8_lossy(&raw);

    for line in content.lines() {
        // D/name//// for directories, /name/rev/date/flags/ignore for files
        let parts: Vec<&str> = line.split('/').collect();
        if parts.len() != 6 || parts[1] != name {
            continue;
        }
        let value = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        let kind = if parts[0] == "D" {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        return Entry {
            revision: value(parts[2]),
            date: value(parts[3]),
            kind: Some(kind),
            author: None,
            url: read_root_line(dir),
            exists: true,
        };
    }
    Entry::unlisted()
}

fn read_root_line(dir: &Path) -> Option<String> {
    let raw = fs::read(dir.join("CVS").join("Root")).ok()?;
    let content = String::from_utf8_lossy(&raw);
    let line = content.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Split a CVSROOT spec into identity and protocol.
///
/// Remote roots look like `:pserver:user@host:/path` or `:ext:host:/path`;
/// the second colon-delimited field is the access method. Local roots are
/// bare paths with no method, reported as `*`.
fn parse_root(line: &str) -> RepoRoot {
    let parts: Vec<&str> = line.split(':').collect();
    let protocol = if parts.len() > 2 && parts[0].is_empty() {
        parts[1].to_string()
    } else {
        "*".to_string()
    };
    RepoRoot {
        id: line.to_string(),
        protocol,
    }
}
