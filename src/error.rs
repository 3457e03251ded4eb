//! # Error Handling
//!
//! Centralized error type for the `vcs-batch` library, built on `thiserror`.
//!
//! Most failure modes in this crate are deliberately *not* errors: metadata
//! probing swallows malformed control files (a path is simply "not under
//! version control"), and external commands that exit nonzero are surfaced as
//! [`crate::exec::Outcome`] values inside command reports rather than raised.
//! The `Error` enum covers the remaining hard failures:
//!
//! - Configuration parsing problems (with optional fix hints).
//! - Operations a given VCS client does not support.
//! - Subprocess launch failures for commands the library itself must run.
//! - Command timeouts (the process has already been terminated when this is
//!   returned).
//! - A missing ssh-agent when one is required to avoid hanging on a background
//!   password prompt.
//! - Path normalization failures.
//! - Wrapped I/O and YAML errors.

use thiserror::Error;

/// Main error type for vcs-batch operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The requested operation is not implemented by the selected VCS client.
    #[error("Operation '{op}' is not supported by {vcs}")]
    UnsupportedOperation { op: String, vcs: String },

    /// A subprocess could not be started at all.
    #[error("Failed to launch '{tool}': {message}")]
    Launch { tool: String, message: String },

    /// A command exceeded its deadline and was forcibly terminated.
    #[error("{op} in {dir} timed out after {seconds}s; the process was killed.\nIncrease timeout_secs in the configuration if the operation legitimately needs longer.")]
    Timeout {
        op: String,
        dir: String,
        seconds: u64,
    },

    /// No usable ssh-agent was found before an ssh-tunneled operation.
    ///
    /// Raised instead of hanging on a background password prompt; can be
    /// disabled with `check_ssh_agent: false` in the configuration.
    #[error("SSH agent not found: {message}")]
    SshAgent { message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid YAML".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("Invalid YAML"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "Unknown diff style".to_string(),
            hint: Some("Use one of: default, context, unified".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint:"));
        assert!(display.contains("default, context, unified"));
    }

    #[test]
    fn test_error_display_unsupported_operation() {
        let error = Error::UnsupportedOperation {
            op: "blame".to_string(),
            vcs: "cvs".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("blame"));
        assert!(display.contains("cvs"));
        assert!(display.contains("not supported"));
    }

    #[test]
    fn test_error_display_timeout() {
        let error = Error::Timeout {
            op: "update".to_string(),
            dir: "/work/repo".to_string(),
            seconds: 30,
        };
        let display = format!("{}", error);
        assert!(display.contains("update"));
        assert!(display.contains("/work/repo"));
        assert!(display.contains("30s"));
        assert!(display.contains("timeout_secs"));
    }

    #[test]
    fn test_error_display_launch() {
        let error = Error::Launch {
            tool: "svn".to_string(),
            message: "No such file or directory".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("svn"));
        assert!(display.contains("No such file or directory"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }
}
