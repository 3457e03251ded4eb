//! Path segment utilities for vcs-batch
//!
//! The batcher stores selections in a tree keyed by path segments, so
//! insertion and lookup must decompose paths identically. These helpers do
//! the decomposition once, in one place: splitting an absolute path into
//! segments (keeping Windows drive-letter and UNC prefixes as the first
//! segment) and joining segments back into an absolute path.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Normalize a user-supplied path to an absolute form.
///
/// Relative paths are resolved against the current directory. `.` components
/// are dropped and `..` components are resolved lexically, so two spellings
/// of the same selection land on the same tree chain.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::Path {
        message: format!("cannot resolve {}: {}", path.display(), e),
    })?;
    Ok(join_segments(&split_segments(&absolute)))
}

/// Split an absolute path into its segments.
///
/// The root marker is implicit; on Windows a drive letter (`C:`) or UNC
/// prefix (`\\server\share`) becomes the first segment so that
/// [`join_segments`] can reconstruct the original form.
pub fn split_segments(path: &Path) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                segments.push(prefix.as_os_str().to_string_lossy().into_owned());
            }
            Component::RootDir | Component::CurDir => {}
            // std::path::absolute keeps `..`; resolve it lexically
            Component::ParentDir => {
                segments.pop();
            }
            Component::Normal(part) => {
                segments.push(part.to_string_lossy().into_owned());
            }
        }
    }
    segments
}

/// Join segments produced by [`split_segments`] back into an absolute path.
#[cfg(not(windows))]
pub fn join_segments(segments: &[String]) -> PathBuf {
    let mut path = PathBuf::from("/");
    for segment in segments {
        path.push(segment);
    }
    path
}

/// Join segments produced by [`split_segments`] back into an absolute path.
///
/// The first segment may be a drive letter (`C:`) or a UNC prefix; both are
/// restored to their native spelling.
#[cfg(windows)]
pub fn join_segments(segments: &[String]) -> PathBuf {
    let Some((first, rest)) = segments.split_first() else {
        return PathBuf::from(r"\");
    };
    let mut path = if first.len() == 2 && first.ends_with(':') {
        PathBuf::from(format!("{}\\", first))
    } else if first.starts_with(r"\\") {
        PathBuf::from(first)
    } else {
        let mut p = PathBuf::from(r"\");
        p.push(first);
        p
    };
    for segment in rest {
        path.push(segment);
    }
    path
}

/// Join segments into a relative path string for use as a command argument.
///
/// An empty slice yields an empty string, which the batcher uses to mean
/// "operate on the working directory itself".
pub fn relative_join(segments: &[String]) -> String {
    segments.join(std::path::MAIN_SEPARATOR_STR)
}
