//! # Metadata Probes
//!
//! Per-VCS readers for the small control files that record what a working
//! copy knows about each item: revision, last-commit date, kind, author, and
//! the remote it came from.
//!
//! Probing is deliberately infallible: a missing, truncated, or malformed
//! control file means "not under version control", never an error. Callers
//! get an [`Entry`] with all-`None` fields and an `exists` flag telling them
//! whether a control file was present at all. Nothing is cached across calls
//! (except the short-lived Perforce result cache, which exists because `p4`
//! must be shelled out to for every answer) — the filesystem owned by the VCS
//! client is the source of truth.
//!
//! The [`MetadataProbe`] trait is the seam between the batching/orchestration
//! core and the concrete control-file formats; the batcher and runner only
//! ever talk to it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub mod cvs;
pub mod perforce;
pub mod svn;

pub use cvs::CvsProbe;
pub use perforce::PerforceProbe;
pub use svn::SvnProbe;

/// What kind of item an entries record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    /// Parse the kind field of an entries record; unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(EntryKind::File),
            "dir" => Some(EntryKind::Dir),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
        }
    }
}

/// Parsed control-file metadata for one path.
///
/// All fields are optional; `exists` records whether a control file was
/// found, so "control file present but item not listed" (an unversioned file
/// inside a checkout) is distinguishable from "no checkout here at all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub revision: Option<String>,
    pub date: Option<String>,
    pub kind: Option<EntryKind>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub exists: bool,
}

impl Entry {
    /// The result for a path with no control data at all.
    pub fn missing() -> Self {
        Self::default()
    }

    /// An entry with no fields but a present control file.
    pub fn unlisted() -> Self {
        Self {
            exists: true,
            ..Self::default()
        }
    }

    /// True when the item is recorded in the control data.
    pub fn versioned(&self) -> bool {
        self.revision.is_some() || self.kind.is_some()
    }
}

/// Identity of the repository/remote that owns a working directory.
///
/// Two paths share a root exactly when their `RepoRoot` values are equal;
/// the batcher uses this to decide where one command invocation ends and the
/// next begins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot {
    /// Stable identity of the remote (SVN: URL host; CVS: the full
    /// `CVS/Root` line; Perforce: the depot prefix).
    pub id: String,
    /// Access protocol (`http`, `svn+ssh`, `pserver`, `ext`, ...).
    pub protocol: String,
}

/// Uniform interface to the per-VCS control-file readers.
pub trait MetadataProbe {
    /// Metadata for a single file or directory. Never fails; see [`Entry`].
    fn entry(&self, path: &Path) -> Entry;

    /// The control directory governing `dir`, if `dir` is a versioned
    /// directory (e.g. `dir/.svn`, `dir/CVS`).
    fn control_dir(&self, dir: &Path) -> Option<PathBuf>;

    /// The owning repository root for a path, read from the directory-level
    /// control data of the path (or of its containing directory for files).
    fn root(&self, path: &Path) -> Option<RepoRoot>;
}

/// Collect the distinct root identities and protocols for a selection.
///
/// Paths without detectable roots are skipped, matching the batcher's
/// exclusion rule.
pub fn collect_roots(
    probe: &dyn MetadataProbe,
    paths: &[PathBuf],
) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut ids = BTreeSet::new();
    let mut protocols = BTreeSet::new();
    for path in paths {
        if let Some(root) = probe.root(path) {
            ids.insert(root.id);
            protocols.insert(root.protocol);
        }
    }
    (ids, protocols)
}
