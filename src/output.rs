//! # Output Utilities
//!
//! Terminal-aware output configuration plus the status-line sink used to show
//! progress while commands run.
//!
//! Color handling honors the usual conventions: `--color=always|never|auto`,
//! the `NO_COLOR` and `CLICOLOR`/`CLICOLOR_FORCE` environment variables, and
//! `TERM=dumb`. The status sink is a trait so the orchestration core can be
//! tested without a terminal.

use std::env;
use std::io::IsTerminal;

use console::Term;

/// Whether to use colors and emojis in output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputConfig {
    /// Use colors and emojis
    Enabled,
    /// Plain text output
    Disabled,
}

impl OutputConfig {
    /// Detect output configuration from environment and command-line flag.
    ///
    /// Priority order:
    /// 1. Explicit `--color` flag value (`always`/`never`)
    /// 2. `NO_COLOR` environment variable (disables)
    /// 3. `CLICOLOR_FORCE` environment variable (enables)
    /// 4. `CLICOLOR=0` (disables)
    /// 5. `TERM=dumb` (disables)
    /// 6. Terminal detection (enables when stdout is a tty)
    pub fn detect(color_flag: Option<&str>) -> Self {
        match color_flag {
            Some("always") => return OutputConfig::Enabled,
            Some("never") => return OutputConfig::Disabled,
            _ => {}
        }

        if env::var_os("NO_COLOR").is_some() {
            return OutputConfig::Disabled;
        }
        if env::var_os("CLICOLOR_FORCE").is_some_and(|v| v != "0") {
            return OutputConfig::Enabled;
        }
        if env::var_os("CLICOLOR").is_some_and(|v| v == "0") {
            return OutputConfig::Disabled;
        }
        if env::var_os("TERM").is_some_and(|v| v == "dumb") {
            return OutputConfig::Disabled;
        }

        if std::io::stdout().is_terminal() {
            OutputConfig::Enabled
        } else {
            OutputConfig::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, OutputConfig::Enabled)
    }

    /// Prefix an emoji when enabled, otherwise return the plain text.
    pub fn emoji(&self, emoji: &str, plain: &str) -> String {
        if self.is_enabled() {
            format!("{} {}", emoji, plain)
        } else {
            plain.to_string()
        }
    }
}

/// Receiver for transient one-line status updates.
pub trait StatusSink {
    fn set_status(&mut self, message: &str);
    fn clear_status(&mut self);
}

/// Status sink that rewrites one line on the terminal via [`console::Term`].
pub struct TermStatus {
    term: Term,
    active: bool,
}

impl TermStatus {
    /// Status goes to stderr so stdout stays clean for command results.
    pub fn stderr() -> Self {
        TermStatus {
            term: Term::stderr(),
            active: false,
        }
    }
}

impl StatusSink for TermStatus {
    fn set_status(&mut self, message: &str) {
        if !self.term.is_term() {
            return;
        }
        if self.active {
            let _ = self.term.clear_line();
        }
        let _ = self.term.write_str(message);
        self.active = true;
    }

    fn clear_status(&mut self) {
        if self.active {
            let _ = self.term.clear_line();
            self.active = false;
        }
    }
}

/// Sink that drops all status updates. Used with `--quiet` and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn set_status(&mut self, _message: &str) {}
    fn clear_status(&mut self) {}
}

/// Test sink that records every update it receives.
#[cfg(test)]
pub(crate) struct RecordingStatus {
    pub messages: Vec<String>,
    pub cleared: u32,
}

#[cfg(test)]
impl RecordingStatus {
    pub fn new() -> Self {
        RecordingStatus {
            messages: Vec::new(),
            cleared: 0,
        }
    }
}

#[cfg(test)]
impl StatusSink for RecordingStatus {
    fn set_status(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn clear_status(&mut self) {
        self.cleared += 1;
    }
}
