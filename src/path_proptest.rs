//! Property-based tests for path decomposition and batching invariants.

use proptest::prelude::*;
use std::path::PathBuf;

use crate::path::{join_segments, relative_join, split_segments};
use crate::tree::PathTree;

/// Path segments that cannot themselves contain separators or traversal.
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,12}".prop_filter("no dot-only segments", |s| {
        s != "." && s != ".."
    })
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..6)
}

proptest! {
    /// Splitting a joined path returns the original segments.
    #[test]
    fn prop_split_join_round_trip(segs in segments()) {
        let joined = join_segments(&segs);
        prop_assert_eq!(split_segments(&joined), segs);
    }

    /// Joining is stable: join(split(join(s))) == join(s).
    #[test]
    fn prop_join_is_stable(segs in segments()) {
        let once = join_segments(&segs);
        let twice = join_segments(&split_segments(&once));
        prop_assert_eq!(once, twice);
    }

    /// A relative join never starts with a separator and has no empty parts.
    #[test]
    fn prop_relative_join_shape(segs in segments()) {
        let rel = relative_join(&segs);
        prop_assert!(!rel.starts_with(std::path::MAIN_SEPARATOR));
        for part in rel.split(std::path::MAIN_SEPARATOR) {
            prop_assert!(!part.is_empty());
        }
    }

    /// Inserting the same files in any order yields the same leaves.
    #[test]
    fn prop_tree_leaves_ignore_insertion_order(
        mut paths in prop::collection::vec(segments(), 1..8)
    ) {
        let mut forward = PathTree::new();
        for segs in &paths {
            forward.insert_file(segs);
        }
        paths.reverse();
        let mut backward = PathTree::new();
        for segs in &paths {
            backward.insert_file(segs);
        }
        prop_assert_eq!(forward.leaves(), backward.leaves());
    }

    /// Duplicate insertion never grows the tree.
    #[test]
    fn prop_tree_insertion_is_idempotent(paths in prop::collection::vec(segments(), 1..8)) {
        let mut once = PathTree::new();
        let mut twice = PathTree::new();
        for segs in &paths {
            once.insert_file(segs);
            twice.insert_file(segs);
            twice.insert_file(segs);
        }
        prop_assert_eq!(once.leaves(), twice.leaves());
    }

    /// Every leaf's full path round-trips through the segment helpers.
    #[test]
    fn prop_leaf_paths_are_reconstructible(paths in prop::collection::vec(segments(), 1..8)) {
        let mut tree = PathTree::new();
        let mut inserted: Vec<PathBuf> = Vec::new();
        for segs in &paths {
            tree.insert_file(segs);
            inserted.push(join_segments(segs));
        }
        for leaf in tree.leaves() {
            prop_assert!(inserted.contains(&leaf.full_path()));
        }
    }
}
