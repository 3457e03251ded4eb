//! # vcs-batch
//!
//! A batch driver for legacy version-control clients (Subversion, CVS,
//! Perforce). Given an arbitrary selection of files and directories, it works
//! out the smallest set of client invocations that covers them, runs those
//! commands concurrently with a hard per-command deadline, and renders what
//! each one produced.
//!
//! The core pieces:
//!
//! - [`batch`]: grouping selections into per-directory invocations.
//! - [`probe`]: reading working-copy metadata (SVN entries files, CVS
//!   control files, `p4 fstat`).
//! - [`ops`]: the operation catalog and per-client argument synthesis.
//! - [`exec`] and [`runner`]: launching clients and driving the poll loop.
//! - [`report`]: rendering the results.

pub mod batch;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exec;
pub mod ops;
pub mod output;
pub mod path;
pub mod pending;
pub mod probe;
pub mod report;
pub mod runner;
pub mod tree;

#[cfg(test)]
mod path_proptest;

pub use config::Config;
pub use error::{Error, Result};
