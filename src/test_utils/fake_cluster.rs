//! In-memory [`SnapshotApi`] that records every call.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::cluster::{CreatedSnapshot, SnapshotApi};
use crate::error::{BackupError, ClusterError, ClusterErrorKind, Result};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List(String),
    Create(String, String),
    Delete(String, String),
}

/// Behaves like a single-repository cluster: duplicate creates and deletes
/// of missing snapshots fail the way the real API does. Failures can also be
/// scripted per snapshot name; each scripted failure fires once.
#[derive(Default)]
pub struct FakeCluster {
    snapshots: RefCell<Vec<Snapshot>>,
    calls: RefCell<Vec<ApiCall>>,
    delete_failures: RefCell<HashMap<String, BackupError>>,
    list_failure: RefCell<Option<BackupError>>,
}

impl FakeCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_snapshots<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.snapshots
            .borrow_mut()
            .extend(names.into_iter().map(Snapshot::new));
        self
    }

    #[must_use]
    pub fn fail_delete(self, name: &str, error: BackupError) -> Self {
        self.delete_failures
            .borrow_mut()
            .insert(name.to_string(), error);
        self
    }

    #[must_use]
    pub fn fail_list(self, error: BackupError) -> Self {
        *self.list_failure.borrow_mut() = Some(error);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    /// Names currently held, in creation order.
    #[must_use]
    pub fn snapshot_names(&self) -> Vec<String> {
        self.snapshots
            .borrow()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.borrow_mut().push(call);
    }
}

fn cluster_error(status: u16, reason: String, kind: ClusterErrorKind) -> BackupError {
    BackupError::Cluster(ClusterError {
        status,
        reason,
        kind,
    })
}

impl SnapshotApi for FakeCluster {
    fn list_snapshots(&self, repository: &str) -> Result<Vec<Snapshot>> {
        self.record(ApiCall::List(repository.to_string()));
        if let Some(err) = self.list_failure.borrow_mut().take() {
            return Err(err);
        }
        Ok(self.snapshots.borrow().clone())
    }

    fn create_snapshot(&self, repository: &str, name: &str) -> Result<CreatedSnapshot> {
        self.record(ApiCall::Create(repository.to_string(), name.to_string()));
        let mut snapshots = self.snapshots.borrow_mut();
        if snapshots.iter().any(|s| s.name == name) {
            return Err(cluster_error(
                400,
                format!("[{repository}:{name}] snapshot with the same name already exists"),
                ClusterErrorKind::DuplicateName,
            ));
        }
        snapshots.push(Snapshot {
            name: name.to_string(),
            state: Some("SUCCESS".to_string()),
        });
        Ok(CreatedSnapshot {
            name: name.to_string(),
            state: Some("SUCCESS".to_string()),
        })
    }

    fn delete_snapshot(&self, repository: &str, name: &str) -> Result<()> {
        self.record(ApiCall::Delete(repository.to_string(), name.to_string()));
        if let Some(err) = self.delete_failures.borrow_mut().remove(name) {
            return Err(err);
        }
        let mut snapshots = self.snapshots.borrow_mut();
        let Some(index) = snapshots.iter().position(|s| s.name == name) else {
            return Err(cluster_error(
                404,
                format!("[{repository}:{name}] is missing"),
                ClusterErrorKind::NotFound,
            ));
        };
        snapshots.remove(index);
        Ok(())
    }
}
