//! Path tree for grouping user selections
//!
//! A [`PathTree`] is a nested mapping from path segment to subtree. A file
//! selection marks a leaf flag on its final segment; a directory selection
//! marks a whole-directory sentinel on the directory's own node. The tree is
//! built once per batch of selections and discarded after the commands are
//! issued.
//!
//! Invariant: every inserted path is represented by exactly one root-to-leaf
//! chain, and repeated insertion of the same path is idempotent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::path::join_segments;

/// One concrete selection recovered from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Segments of the containing directory.
    pub dir: Vec<String>,
    /// File name within `dir`, or `None` when the directory itself is
    /// selected as a whole.
    pub name: Option<String>,
}

impl Leaf {
    /// Absolute path of the selected item.
    pub fn full_path(&self) -> PathBuf {
        match &self.name {
            Some(name) => join_segments(&self.dir).join(name),
            None => join_segments(&self.dir),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Node {
    children: BTreeMap<String, Node>,
    /// The directory at this node is selected as a whole.
    whole_dir: bool,
    /// The file at this node is selected.
    file: bool,
}

/// Tree of selected files and directories keyed by path segment.
#[derive(Debug, Default, Clone)]
pub struct PathTree {
    root: Node,
}

impl PathTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && !self.root.whole_dir
    }

    /// Insert a file selection given its path segments.
    ///
    /// An empty segment list is ignored; a file must have a name.
    pub fn insert_file(&mut self, segments: &[String]) {
        let Some((name, dirs)) = segments.split_last() else {
            return;
        };
        let node = self.descend(dirs);
        node.children.entry(name.clone()).or_default().file = true;
    }

    /// Insert a whole-directory selection given its path segments.
    pub fn insert_dir(&mut self, segments: &[String]) {
        self.descend(segments).whole_dir = true;
    }

    fn descend(&mut self, segments: &[String]) -> &mut Node {
        let mut node = &mut self.root;
        for segment in segments {
            node = node.children.entry(segment.clone()).or_default();
        }
        node
    }

    /// Enumerate all selections currently represented by the tree.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        let mut stack = Vec::new();
        collect(&self.root, &mut stack, &mut leaves);
        leaves
    }

    /// Collapse subtrees that are covered by a whole-directory selection.
    ///
    /// Any node carrying the whole-directory sentinel whose directory passes
    /// the `covered` probe (typically "has a VCS control directory", so the
    /// recursive client command already reaches everything below) drops all
    /// finer-grained selections beneath it.
    pub fn collapse_covered(&mut self, covered: &mut dyn FnMut(&Path) -> bool) {
        let mut stack = Vec::new();
        collapse(&mut self.root, &mut stack, covered);
    }
}

fn collect(node: &Node, stack: &mut Vec<String>, leaves: &mut Vec<Leaf>) {
    if node.whole_dir {
        leaves.push(Leaf {
            dir: stack.clone(),
            name: None,
        });
    }
    for (segment, child) in &node.children {
        if child.file {
            leaves.push(Leaf {
                dir: stack.clone(),
                name: Some(segment.clone()),
            });
        }
        stack.push(segment.clone());
        collect(child, stack, leaves);
        stack.pop();
    }
}

fn collapse(node: &mut Node, stack: &mut Vec<String>, covered: &mut dyn FnMut(&Path) -> bool) {
    if node.whole_dir && covered(&join_segments(stack)) {
        node.children.clear();
        node.file = false;
        return;
    }
    for (segment, child) in node.children.iter_mut() {
        stack.push(segment.clone());
        collapse(child, stack, covered);
        stack.pop();
    }
}
