//! Default locations for vcs-batch files.

use std::path::PathBuf;

/// Default configuration file path: `<config dir>/vcs-batch/config.yaml`.
///
/// `<config dir>` is the platform convention (`~/.config` on Linux,
/// `~/Library/Application Support` on macOS, `%APPDATA%` on Windows); the
/// current directory stands in when none is available.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vcs-batch")
        .join("config.yaml")
}
