//! esbackup - create and prune date-named Elasticsearch snapshots.
//!
//! Snapshots are named `<prefix><YYYYMMDD>` after the UTC day they were
//! taken. Pruning lists a repository and deletes every snapshot whose
//! embedded date is on or before a retention cutoff.

pub mod app;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod snapshot;
pub mod test_utils;

pub use error::{BackupError, Result};
