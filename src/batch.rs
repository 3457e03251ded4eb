//! # Path Batching
//!
//! Turning an arbitrary set of selected files and directories into the
//! smallest set of VCS client invocations that covers them.
//!
//! The pipeline has three steps:
//!
//! 1. **Build** a [`PathTree`] from the normalized selections (files as leaf
//!    flags, directories as whole-directory sentinels).
//! 2. **Collapse**: a whole-directory selection over a versioned directory
//!    already reaches everything beneath it recursively, so finer selections
//!    under it are dropped ([`PathTree::collapse_covered`]).
//! 3. **Regroup**: each remaining selection is walked upward until the
//!    repository identity reported by the probe changes; everything that
//!    shares the boundary directory is merged into one invocation with
//!    relative path arguments ([`find_common_root`]).
//!
//! Selections with no detectable repository anywhere above them are silently
//! excluded (logged at debug level). Steps 2 and 3 only run when the
//! operation allows pruning: `add` must keep every explicit path because the
//! client has no record of the new items yet.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::path::{join_segments, normalize, relative_join, split_segments};
use crate::probe::MetadataProbe;
use crate::tree::PathTree;

/// Group selections into per-directory invocations.
///
/// Returns a map from working directory to the relative path arguments to
/// pass there; an empty-string argument means the directory itself. Both the
/// map and each argument list are sorted, so equal selections always produce
/// equal groupings.
pub fn group_paths(
    probe: &dyn MetadataProbe,
    paths: &[PathBuf],
    prune: bool,
) -> Result<BTreeMap<PathBuf, Vec<String>>> {
    let mut tree = PathTree::new();
    for path in paths {
        let normalized = normalize(path)?;
        let segments = split_segments(&normalized);
        if normalized.is_dir() {
            tree.insert_dir(&segments);
        } else {
            tree.insert_file(&segments);
        }
    }

    if prune {
        tree.collapse_covered(&mut |dir| probe.control_dir(dir).is_some());
    }

    let mut groups: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();
    for leaf in tree.leaves() {
        let full = leaf.full_path();
        let grouped = if prune {
            find_common_root(probe, &full)
        } else {
            // Without regrouping each selection runs in its own directory,
            // but paths outside any checkout are still excluded.
            has_enclosing_root(probe, &full).then(|| {
                let arg = leaf.name.clone().unwrap_or_default();
                (join_segments(&leaf.dir), arg)
            })
        };
        match grouped {
            Some((dir, arg)) => {
                groups.entry(dir).or_default().insert(arg);
            }
            None => {
                debug!("excluding {}: no repository root found", full.display());
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(dir, args)| (dir, args.into_iter().collect()))
        .collect())
}

/// Walk from `path` toward the filesystem root until the repository identity
/// changes, and return the boundary directory plus the path relative to it.
///
/// A relative path of `""` means `path` is the boundary directory itself.
/// `None` means no repository owns `path` at all.
pub fn find_common_root(probe: &dyn MetadataProbe, path: &Path) -> Option<(PathBuf, String)> {
    let segments = split_segments(path);
    if segments.is_empty() {
        return None;
    }
    // The selection itself may carry no control data (a file, or a path
    // under one or more unversioned directories inside a checkout); the
    // nearest versioned ancestor vouches for it.
    let (anchor, root) = match probe.root(path) {
        Some(root) => (segments.len(), root),
        None => (0..segments.len()).rev().find_map(|i| {
            probe
                .root(&join_segments(&segments[..i]))
                .map(|root| (i, root))
        })?,
    };
    // Shrink the prefix one segment at a time; the first prefix owned by a
    // different root (or none) marks the boundary.
    for i in (0..anchor).rev() {
        let prefix = join_segments(&segments[..i]);
        if probe.root(&prefix).as_ref() != Some(&root) {
            let boundary = join_segments(&segments[..=i]);
            let partial = relative_join(&segments[i + 1..]);
            return Some((boundary, partial));
        }
    }
    // Every ancestor shares the root; fall back to the containing directory.
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some((path.parent()?.to_path_buf(), name))
}

/// True when `path` or any of its ancestors sits in a detectable checkout.
///
/// This is the exclusion test for unpruned operations: an `add` target has no
/// metadata of its own yet, so its ancestors vouch for it.
fn has_enclosing_root(probe: &dyn MetadataProbe, path: &Path) -> bool {
    if probe.root(path).is_some() {
        return true;
    }
    let segments = split_segments(path);
    (0..segments.len())
        .rev()
        .any(|i| probe.root(&join_segments(&segments[..i])).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Entry, RepoRoot};
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Probe that knows a fixed set of versioned directories. A file's root
    /// is its containing directory's root, mirroring how the real probes
    /// resolve files through their directory-level control data.
    struct FakeProbe {
        roots: HashMap<PathBuf, RepoRoot>,
    }

    impl FakeProbe {
        fn new() -> Self {
            FakeProbe {
                roots: HashMap::new(),
            }
        }

        fn versioned(mut self, dir: &Path, root_id: &str) -> Self {
            self.roots.insert(
                dir.to_path_buf(),
                RepoRoot {
                    id: root_id.to_string(),
                    protocol: "http".to_string(),
                },
            );
            self
        }
    }

    impl MetadataProbe for FakeProbe {
        fn entry(&self, _path: &Path) -> Entry {
            Entry::missing()
        }

        fn control_dir(&self, dir: &Path) -> Option<PathBuf> {
            self.roots.contains_key(dir).then(|| dir.join(".svn"))
        }

        fn root(&self, path: &Path) -> Option<RepoRoot> {
            // Like the real probes: a directory answers only for itself, a
            // file resolves through its containing directory.
            if path.is_dir() {
                self.roots.get(path).cloned()
            } else {
                match self.roots.get(path) {
                    Some(root) => Some(root.clone()),
                    None => self.roots.get(path.parent()?).cloned(),
                }
            }
        }
    }

    /// On-disk layout: two sibling files plus a subdirectory with one file,
    /// all inside one checkout.
    fn one_repo() -> (TempDir, PathBuf, FakeProbe) {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        fs::create_dir_all(repo.join("sub")).unwrap();
        fs::write(repo.join("a.py"), "").unwrap();
        fs::write(repo.join("b.py"), "").unwrap();
        fs::write(repo.join("sub").join("c.py"), "").unwrap();
        let probe = FakeProbe::new()
            .versioned(&repo, "svn.example.com")
            .versioned(&repo.join("sub"), "svn.example.com");
        (tmp, repo, probe)
    }

    #[test]
    fn test_files_in_one_repo_group_into_one_invocation() {
        let (_tmp, repo, probe) = one_repo();
        let paths = vec![
            repo.join("a.py"),
            repo.join("b.py"),
            repo.join("sub").join("c.py"),
        ];

        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 1);
        let args = &groups[&repo];
        assert_eq!(
            args,
            &vec![
                "a.py".to_string(),
                "b.py".to_string(),
                format!("sub{}c.py", std::path::MAIN_SEPARATOR),
            ]
        );
    }

    #[test]
    fn test_whole_dir_selection_collapses_nested_files() {
        let (_tmp, repo, probe) = one_repo();
        let paths = vec![repo.clone(), repo.join("a.py"), repo.join("sub").join("c.py")];

        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 1);
        // The directory selection covers everything: one empty argument.
        assert_eq!(groups[&repo], vec!["".to_string()]);
    }

    #[test]
    fn test_unversioned_dir_selection_does_not_collapse() {
        let (_tmp, repo, probe) = one_repo();
        // plain/ has no control dir, so selecting it whole cannot stand in
        // for the file beneath it.
        let plain = repo.join("plain");
        fs::create_dir_all(&plain).unwrap();
        fs::write(plain.join("d.py"), "").unwrap();

        let paths = vec![plain.clone(), plain.join("d.py")];
        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[&repo],
            vec![
                "plain".to_string(),
                format!("plain{}d.py", std::path::MAIN_SEPARATOR),
            ]
        );
    }

    #[test]
    fn test_file_under_nested_unversioned_dirs_regroups_to_checkout() {
        let (_tmp, repo, probe) = one_repo();
        // Two unversioned levels between the checkout top and the file; the
        // upward walk has to pass both before it finds the owning root.
        let deep = repo.join("x").join("y");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("new.py"), "").unwrap();

        let paths = vec![repo.join("a.py"), deep.join("new.py")];
        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[&repo],
            vec![
                "a.py".to_string(),
                format!("x{0}y{0}new.py", std::path::MAIN_SEPARATOR),
            ]
        );
    }

    #[test]
    fn test_distinct_roots_stay_separate() {
        let tmp = TempDir::new().unwrap();
        let alpha = tmp.path().join("alpha");
        let beta = tmp.path().join("beta");
        fs::create_dir_all(&alpha).unwrap();
        fs::create_dir_all(&beta).unwrap();
        fs::write(alpha.join("a.py"), "").unwrap();
        fs::write(beta.join("b.py"), "").unwrap();
        let probe = FakeProbe::new()
            .versioned(&alpha, "alpha.example.com")
            .versioned(&beta, "beta.example.com");

        let paths = vec![alpha.join("a.py"), beta.join("b.py")];
        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&alpha], vec!["a.py".to_string()]);
        assert_eq!(groups[&beta], vec!["b.py".to_string()]);
    }

    #[test]
    fn test_rootless_paths_are_excluded() {
        let (_tmp, repo, probe) = one_repo();
        let outside = _tmp.path().join("outside.py");
        fs::write(&outside, "").unwrap();

        let paths = vec![repo.join("a.py"), outside];
        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&repo], vec!["a.py".to_string()]);
    }

    #[test]
    fn test_add_keeps_explicit_paths_without_collapsing() {
        let (_tmp, repo, probe) = one_repo();
        let new_file = repo.join("sub").join("new.py");
        fs::write(&new_file, "").unwrap();

        let paths = vec![repo.clone(), new_file];
        let groups = group_paths(&probe, &paths, false).unwrap();
        // No collapse, no regrouping: the dir and the file each run where
        // they live.
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&repo], vec!["".to_string()]);
        assert_eq!(groups[&repo.join("sub")], vec!["new.py".to_string()]);
    }

    #[test]
    fn test_add_inside_unversioned_subdir_still_included() {
        let (_tmp, repo, probe) = one_repo();
        let fresh = repo.join("fresh");
        fs::create_dir_all(&fresh).unwrap();
        let new_file = fresh.join("new.py");
        fs::write(&new_file, "").unwrap();

        // fresh/ itself is not versioned yet, but an ancestor is.
        let groups = group_paths(&probe, &[new_file], false).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&fresh], vec!["new.py".to_string()]);
    }

    #[test]
    fn test_duplicate_selections_are_idempotent() {
        let (_tmp, repo, probe) = one_repo();
        let paths = vec![repo.join("a.py"), repo.join("a.py"), repo.join("a.py")];

        let groups = group_paths(&probe, &paths, true).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&repo], vec!["a.py".to_string()]);
    }

    #[test]
    fn test_grouping_is_deterministic_across_input_order() {
        let (_tmp, repo, probe) = one_repo();
        let forward = vec![
            repo.join("a.py"),
            repo.join("b.py"),
            repo.join("sub").join("c.py"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = group_paths(&probe, &forward, true).unwrap();
        let b = group_paths(&probe, &reversed, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_find_common_root_walks_to_checkout_top() {
        let (_tmp, repo, probe) = one_repo();
        let (dir, partial) = find_common_root(&probe, &repo.join("sub").join("c.py")).unwrap();
        assert_eq!(dir, repo);
        assert_eq!(partial, format!("sub{}c.py", std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn test_find_common_root_for_checkout_dir_itself() {
        let (_tmp, repo, probe) = one_repo();
        let (dir, partial) = find_common_root(&probe, &repo).unwrap();
        assert_eq!(dir, repo);
        assert_eq!(partial, "");
    }

    #[test]
    fn test_find_common_root_none_outside_checkout() {
        let (_tmp, _repo, probe) = one_repo();
        assert!(find_common_root(&probe, &_tmp.path().join("elsewhere.py")).is_none());
    }
}
