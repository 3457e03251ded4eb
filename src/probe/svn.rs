//! Subversion working-copy metadata.
//!
//! Pre-1.7 Subversion keeps an `entries` file inside each directory's `.svn`
//! (or `_svn`) control directory. Three on-disk formats are handled:
//!
//! - the XML format used by clients before 1.4 (`<?xml ...` first line),
//! - format 8 (first line `8`, written by 1.4),
//! - format 9 (first line `9`, written by 1.5/1.6).
//!
//! Formats 8 and 9 are line-oriented: a fixed-offset block for the directory
//! itself, then one block per child delimited by form-feed lines. This parser
//! is a best-effort legacy shim: an unrecognized first line is logged and
//! read with the format-8 offsets, and anything truncated or otherwise
//! unreadable degrades to an empty [`Entry`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;
use url::Url;

use super::{Entry, EntryKind, MetadataProbe, RepoRoot};

/// Control directory names checked in order. `_svn` is the spelling used on
/// Windows when `SVN_ASP_DOT_NET_HACK` is set.
const CONTROL_DIR_NAMES: [&str; 2] = [".svn", "_svn"];

/// Line offsets into an entries block for one record.
struct Offsets {
    revision: usize,
    date: usize,
    kind: usize,
    author: usize,
    url: Option<usize>,
}

/// Directory-level block, format 9 (SVN 1.5/1.6).
const DIR_V9: Offsets = Offsets {
    revision: 3,
    date: 9,
    kind: 2,
    author: 11,
    url: Some(4),
};

/// Directory-level block, format 8 (SVN 1.4).
const DIR_V8: Offsets = Offsets {
    revision: 10,
    date: 9,
    kind: 2,
    author: 11,
    url: Some(4),
};

/// Per-file block, relative to the form-feed delimiter; identical in formats
/// 8 and 9.
const FILE_BLOCK: Offsets = Offsets {
    revision: 9,
    date: 6,
    kind: 1,
    author: 10,
    url: None,
};

/// Metadata probe for Subversion working copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvnProbe;

impl SvnProbe {
    pub fn new() -> Self {
        SvnProbe
    }
}

impl MetadataProbe for SvnProbe {
    fn entry(&self, path: &Path) -> Entry {
        read_entry(path, None)
    }

    fn control_dir(&self, dir: &Path) -> Option<PathBuf> {
        find_control_dir(dir)
    }

    fn root(&self, path: &Path) -> Option<RepoRoot> {
        // The directory-level record carries the checkout URL; its host
        // identifies the repository.
        let entry = read_entry(path, Some(""));
        root_from_url(entry.url.as_deref()?)
    }
}

pub(crate) fn find_control_dir(dir: &Path) -> Option<PathBuf> {
    for name in CONTROL_DIR_NAMES {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }
    None
}

/// Derive the repository identity from a checkout URL.
///
/// The host alone identifies the repository so that nested checkouts of
/// subdirectories (whose URLs differ by path) still group together. For
/// host-less `file://` URLs the scheme plus the first path component stands
/// in for the host.
fn root_from_url(url: &str) -> Option<RepoRoot> {
    let parsed = Url::parse(url).ok()?;
    let protocol = parsed.scheme().to_string();
    let id = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => {
            let first = parsed
                .path()
                .split('/')
                .find(|part| !part.is_empty())
                .unwrap_or_default();
            format!("{}:{}", parsed.scheme(), first)
        }
    };
    Some(RepoRoot { id, protocol })
}

/// Read the entries record for `path`.
///
/// `name_override` forces the record name to look up: `Some("")` selects the
/// directory-level record of the directory containing (or being) `path`.
fn read_entry(path: &Path, name_override: Option<&str>) -> Entry {
    let (dir, name) = match name_override {
        Some(name) if path.is_dir() => (path, name.to_string()),
        Some(name) => match path.parent() {
            Some(parent) => (parent, name.to_string()),
            None => return Entry::missing(),
        },
        None if path.is_dir() => (path, String::new()),
        None => {
            let Some(parent) = path.parent() else {
                return Entry::missing();
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (parent, name)
        }
    };

    let Some(control) = find_control_dir(dir) else {
        return Entry::missing();
    };
    let entries_file = control.join("entries");
    let Ok(raw) = fs::read(&entries_file) else {
        return Entry::missing();
    };
    let content = String::from_utf8_lossy(&raw);

    let Some(first_line) = content.lines().next() else {
        return Entry::unlisted();
    };
    if first_line.trim_start().starts_with("<?xml") {
        return parse_xml_entries(&content, &name);
    }

    let offsets = match first_line.trim() {
        "9" => &DIR_V9,
        "8" => &DIR_V8,
        other => {
            warn!(
                "unrecognized Subversion entries format {:?} in {}; reading as format 8",
                other,
                entries_file.display()
            );
            &DIR_V8
        }
    };
    if name.is_empty() {
        parse_dir_record(&content, offsets)
    } else {
        parse_file_record(&content, &name)
    }
}

fn field(lines: &[&str], index: usize) -> Option<String> {
    let value = lines.get(index)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The directory's own record occupies fixed offsets from the top of the
/// file, just past the format line.
fn parse_dir_record(content: &str, offsets: &Offsets) -> Entry {
    let lines: Vec<&str> = content.lines().collect();
    Entry {
        revision: field(&lines, offsets.revision),
        date: field(&lines, offsets.date),
        kind: field(&lines, offsets.kind).as_deref().and_then(EntryKind::parse),
        author: field(&lines, offsets.author),
        url: offsets.url.and_then(|i| field(&lines, i)),
        exists: true,
    }
}

/// Per-file records follow the directory block, each introduced by a line
/// starting with a form feed; the record name is the first line after the
/// delimiter.
fn parse_file_record(content: &str, name: &str) -> Entry {
    let lines: Vec<&str> = content.lines().collect();
    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with('\x0c') && lines.get(i + 1).copied() == Some(name) {
            start = Some(i + 1);
            break;
        }
    }
    let Some(start) = start else {
        return Entry::unlisted();
    };
    let end = lines[start..]
        .iter()
        .position(|line| line.starts_with('\x0c'))
        .map(|rel| start + rel)
        .unwrap_or(lines.len());
    let block = &lines[start..end];

    Entry {
        revision: field(block, FILE_BLOCK.revision),
        date: field(block, FILE_BLOCK.date),
        kind: field(block, FILE_BLOCK.kind)
            .as_deref()
            .and_then(EntryKind::parse),
        author: field(block, FILE_BLOCK.author),
        url: None,
        exists: true,
    }
}

/// The pre-1.4 XML format stores one `<entry .../>` element per record with
/// everything in attributes. A full XML parser is overkill for this legacy
/// shim; an attribute scan recovers the handful of fields needed.
fn parse_xml_entries(content: &str, name: &str) -> Entry {
    let (Ok(entry_re), Ok(attr_re)) = (
        Regex::new(r"<entry\b([^>]*)>"),
        Regex::new(r#"([\w-]+)\s*=\s*"([^"]*)""#),
    ) else {
        return Entry::unlisted();
    };

    for caps in entry_re.captures_iter(content) {
        let attrs: HashMap<&str, &str> = attr_re
            .captures_iter(caps.get(1).map_or("", |m| m.as_str()))
            .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
            .collect();
        if attrs.get("name").copied().unwrap_or("") != name {
            continue;
        }
        let get = |key: &str| {
            attrs
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };
        return Entry {
            revision: get("committed-rev"),
            date: get("committed-date"),
            kind: attrs.get("kind").copied().and_then(EntryKind::parse),
            author: get("last-author"),
            url: get("url"),
            exists: true,
        };
    }
    Entry::unlisted()
}
