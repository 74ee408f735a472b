//! Elasticsearch snapshot API access.
//!
//! [`SnapshotApi`] is what the lifecycle code talks to; [`ClusterClient`]
//! implements it over HTTP.

pub mod client;

pub use client::{ClusterClient, DEFAULT_PORT};

use serde::Serialize;

use crate::error::Result;
use crate::snapshot::Snapshot;

/// Result of a completed snapshot creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSnapshot {
    pub name: String,
    /// State reported by the cluster (`SUCCESS`, `PARTIAL`, `FAILED`).
    pub state: Option<String>,
}

/// Snapshot operations against one cluster.
///
/// Every call is a single blocking request; implementations never retry.
pub trait SnapshotApi {
    /// All snapshots in `repository`, in the order the cluster returns them.
    fn list_snapshots(&self, repository: &str) -> Result<Vec<Snapshot>>;

    /// Create `name` and wait for the cluster to finish it.
    fn create_snapshot(&self, repository: &str, name: &str) -> Result<CreatedSnapshot>;

    fn delete_snapshot(&self, repository: &str, name: &str) -> Result<()>;
}
