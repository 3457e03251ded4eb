//! # Configuration
//!
//! YAML configuration for vcs-batch.
//!
//! Everything has a sensible default, so a config file is optional: the
//! default location (see [`crate::defaults`]) is used when present, and an
//! explicitly passed path must exist. Parse failures carry a hint where one
//! is known.
//!
//! ```yaml
//! svn_command: /opt/svn/bin/svn
//! diff_style: unified
//! check_ssh_agent: true
//! timeout_secs: 30
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which flavor of diff output to request from clients that support a
/// choice (CVS).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStyle {
    /// The client's native format.
    #[default]
    Default,
    /// Context diffs (`-c`).
    Context,
    /// Unified diffs (`-u`).
    Unified,
}

impl DiffStyle {
    /// Extra flag for `cvs diff`, if any.
    pub fn cvs_flag(&self) -> Option<&'static str> {
        match self {
            DiffStyle::Default => None,
            DiffStyle::Context => Some("-c"),
            DiffStyle::Unified => Some("-u"),
        }
    }
}

/// How credentials reach the VCS client for remote operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Let the client use its own credential stores and agents.
    #[default]
    Default,
    /// Pass explicitly supplied credentials on the command line (SVN only).
    Manual,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Subversion client executable.
    #[serde(default = "default_svn_command")]
    pub svn_command: String,

    /// CVS client executable.
    #[serde(default = "default_cvs_command")]
    pub cvs_command: String,

    /// Perforce client executable.
    #[serde(default = "default_p4_command")]
    pub p4_command: String,

    /// Diff flavor for clients that support one.
    #[serde(default)]
    pub diff_style: DiffStyle,

    /// Refuse ssh-tunneled remote operations when no usable ssh-agent is
    /// running, instead of hanging on a hidden password prompt.
    #[serde(default = "default_true")]
    pub check_ssh_agent: bool,

    /// Hard deadline per command, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Spacing between completion checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Credential handling for remote operations.
    #[serde(default)]
    pub auth_mode: AuthMode,
}

fn default_svn_command() -> String {
    "svn".to_string()
}

fn default_cvs_command() -> String {
    "cvs".to_string()
}

fn default_p4_command() -> String {
    "p4".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Config {
            svn_command: default_svn_command(),
            cvs_command: default_cvs_command(),
            p4_command: default_p4_command(),
            diff_style: DiffStyle::default(),
            check_ssh_agent: true,
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            auth_mode: AuthMode::default(),
        }
    }
}

impl Config {
    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            let message = e.to_string();
            let hint = if message.contains("diff_style") {
                Some("valid diff styles are: default, context, unified".to_string())
            } else if message.contains("auth_mode") {
                Some("valid auth modes are: default, manual".to_string())
            } else if message.contains("unknown variant") || message.contains("invalid type") {
                Some("check the value types in your configuration file".to_string())
            } else {
                None
            };
            Error::ConfigParse { message, hint }
        })
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("cannot read {}: {}", path.display(), e),
            hint: None,
        })?;
        Self::parse(&content)
    }

    /// Load from an explicit path, or from the default location when one
    /// exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = crate::defaults::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}
