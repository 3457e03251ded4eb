//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `vcs-batch` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The `execute` function is responsible for orchestrating the necessary
//! operations, calling into the `vcs_batch` library for the core logic.

pub mod completions;
pub mod info;
pub mod plan;
pub mod run;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::ValueEnum;

use vcs_batch::ops::VcsKind;

/// VCS selection on the command line: explicit, or detected from control
/// directories next to the first path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VcsChoice {
    Auto,
    Svn,
    Cvs,
    P4,
}

impl VcsChoice {
    pub fn resolve(self, paths: &[PathBuf]) -> Result<VcsKind> {
        match self {
            VcsChoice::Svn => Ok(VcsKind::Svn),
            VcsChoice::Cvs => Ok(VcsKind::Cvs),
            VcsChoice::P4 => Ok(VcsKind::Perforce),
            VcsChoice::Auto => {
                for path in paths {
                    if let Some(kind) = VcsKind::detect(path) {
                        return Ok(kind);
                    }
                }
                bail!(
                    "could not detect a version control system from the given paths; \
                     pass --vcs svn|cvs|p4 explicitly"
                );
            }
        }
    }
}
