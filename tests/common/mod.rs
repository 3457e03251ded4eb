//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_svn_checkout("repo", "http://svn.example.com/svn/repo");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::svn_entries_v9;
    #[allow(unused_imports)]
    pub use super::TestFixture;
}

/// Build a Subversion format-9 `entries` file: the directory record plus one
/// file record per `(name, revision, date, author)` tuple.
#[allow(dead_code)]
pub fn svn_entries_v9(url: &str, rev: &str, files: &[(&str, &str, &str, &str)]) -> String {
    let mut lines = vec![
        "9".to_string(),
        String::new(),
        "dir".to_string(),
        rev.to_string(),
        url.to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        "2024-01-15T10:00:00.000000Z".to_string(),
        String::new(),
        "alice".to_string(),
    ];
    for (name, rev, date, author) in files {
        lines.push("\x0c".to_string());
        lines.push(name.to_string());
        lines.push("file".to_string());
        lines.extend(std::iter::repeat(String::new()).take(4));
        lines.push(date.to_string());
        lines.extend(std::iter::repeat(String::new()).take(2));
        lines.push(rev.to_string());
        lines.push(author.to_string());
    }
    lines.join("\n")
}

/// A test fixture providing a temporary directory that can be populated with
/// fake SVN and CVS checkouts (control files only, no client needed).
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a directory shaped like an SVN working copy: a `.svn/entries`
    /// file in format 9 with the given checkout URL.
    pub fn with_svn_checkout(self, dir: &str, url: &str) -> Self {
        self.with_svn_checkout_files(dir, url, &[])
    }

    /// Like [`Self::with_svn_checkout`], also recording per-file entries and
    /// creating the files themselves.
    pub fn with_svn_checkout_files(
        self,
        dir: &str,
        url: &str,
        files: &[(&str, &str, &str, &str)],
    ) -> Self {
        let entries = svn_entries_v9(url, "12", files);
        self.temp_dir
            .child(format!("{}/.svn/entries", dir))
            .write_str(&entries)
            .expect("Failed to write entries file");
        for (name, _, _, _) in files {
            self.temp_dir
                .child(format!("{}/{}", dir, name))
                .write_str("")
                .expect("Failed to write working file");
        }
        self
    }

    /// Add a directory shaped like a CVS working copy with the given
    /// `Entries` content and `Root` line.
    pub fn with_cvs_checkout(self, dir: &str, entries: &str, root: &str) -> Self {
        self.temp_dir
            .child(format!("{}/CVS/Entries", dir))
            .write_str(entries)
            .expect("Failed to write Entries file");
        self.temp_dir
            .child(format!("{}/CVS/Root", dir))
            .write_str(root)
            .expect("Failed to write Root file");
        self
    }

    /// Add a vcs-batch config file with the given YAML content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("config.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file added by [`Self::with_config`].
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
