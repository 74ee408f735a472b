//! Backup and delete operations.
//!
//! Each operation makes a single attempt: nothing here retries. Bulk
//! deletion is the one place where a failure does not abort the operation;
//! every candidate is attempted and the outcome of each is reported.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cluster::{CreatedSnapshot, SnapshotApi};
use crate::error::{BackupError, Result};
use crate::snapshot::{self, DEFAULT_PREFIX, Snapshot};

/// What `delete` should remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    /// Exactly this snapshot; the repository is not listed.
    Named(String),
    /// Every dated snapshot at least `age_days` older than today.
    OlderThan { age_days: i64, dry_run: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub repository: String,
    pub snapshot: CreatedSnapshot,
}

#[derive(Debug)]
pub struct DeleteOutcome {
    pub name: String,
    pub result: Result<()>,
}

impl DeleteOutcome {
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct DeleteReport {
    pub repository: String,
    /// Set for age-based deletes.
    pub cutoff: Option<NaiveDate>,
    /// Candidates that were selected but not deleted because of a dry run.
    pub skipped: Vec<String>,
    pub outcomes: Vec<DeleteOutcome>,
}

impl DeleteReport {
    pub fn deleted(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_deleted())
            .map(|o| o.name.as_str())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeleteOutcome> {
        self.outcomes.iter().filter(|o| !o.is_deleted())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// `Ok` when every attempted deletion succeeded.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed().count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(BackupError::PartialDelete {
                failed,
                total: self.outcomes.len(),
            })
        }
    }
}

/// Snapshot lifecycle for one repository.
pub struct Lifecycle<'a, A: SnapshotApi> {
    api: &'a A,
    repository: String,
    prefix: String,
    today: Option<NaiveDate>,
}

impl<'a, A: SnapshotApi> Lifecycle<'a, A> {
    pub fn new(api: &'a A, repository: impl Into<String>) -> Self {
        Self {
            api,
            repository: repository.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            today: None,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Pin the date used for generated names instead of the current UTC date.
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn todays_name(&self) -> String {
        match self.today {
            Some(today) => snapshot::name_for_date(&self.prefix, today),
            None => snapshot::generate_name(&self.prefix),
        }
    }

    /// Create one snapshot, named `name` or after today's date.
    pub fn backup(&self, name: Option<&str>) -> Result<BackupReport> {
        let name = name.map_or_else(|| self.todays_name(), str::to_string);
        info!(repository = %self.repository, %name, "creating snapshot");

        let created = self
            .api
            .create_snapshot(&self.repository, &name)
            .map_err(|err| {
                error!(%name, "snapshot creation failed: {err}");
                BackupError::BackupFailed {
                    name: name.clone(),
                    source: Box::new(err),
                }
            })?;

        match created.state.as_deref() {
            Some("SUCCESS") | None => {}
            Some(state) => warn!(%name, state, "snapshot completed in a non-success state"),
        }

        Ok(BackupReport {
            repository: self.repository.clone(),
            snapshot: created,
        })
    }

    pub fn delete(&self, request: &DeleteRequest) -> Result<DeleteReport> {
        match request {
            DeleteRequest::Named(name) => self.delete_named(name),
            DeleteRequest::OlderThan { age_days, dry_run } => {
                self.delete_older_than(*age_days, *dry_run)
            }
        }
    }

    fn delete_named(&self, name: &str) -> Result<DeleteReport> {
        info!(repository = %self.repository, name, "deleting snapshot");
        self.api.delete_snapshot(&self.repository, name)?;
        Ok(DeleteReport {
            repository: self.repository.clone(),
            outcomes: vec![DeleteOutcome {
                name: name.to_string(),
                result: Ok(()),
            }],
            ..DeleteReport::default()
        })
    }

    /// Snapshots in the repository dated on or before `cutoff`.
    pub fn old_snapshots(&self, cutoff: NaiveDate) -> Result<Vec<Snapshot>> {
        let listing = self.api.list_snapshots(&self.repository)?;
        Ok(snapshot::select_old(&listing, cutoff))
    }

    fn delete_older_than(&self, age_days: i64, dry_run: bool) -> Result<DeleteReport> {
        let reference = self.todays_name();
        let cutoff = snapshot::cutoff_date(&reference, age_days)?;
        info!(
            repository = %self.repository,
            %reference,
            age_days,
            %cutoff,
            "pruning snapshots"
        );

        let candidates = self.old_snapshots(cutoff)?;
        let mut report = DeleteReport {
            repository: self.repository.clone(),
            cutoff: Some(cutoff),
            ..DeleteReport::default()
        };

        if dry_run {
            report.skipped = candidates.into_iter().map(|s| s.name).collect();
            info!(count = report.skipped.len(), "dry run, nothing deleted");
            return Ok(report);
        }

        for candidate in candidates {
            let result = self.api.delete_snapshot(&self.repository, &candidate.name);
            if let Err(err) = &result {
                error!(name = %candidate.name, "failed to delete snapshot: {err}");
            }
            report.outcomes.push(DeleteOutcome {
                name: candidate.name,
                result,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClusterError, ClusterErrorKind};
    use crate::test_utils::{ApiCall, FakeCluster};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed(api: &FakeCluster) -> Lifecycle<'_, FakeCluster> {
        Lifecycle::new(api, "nightly").with_today(ymd(2024, 3, 26))
    }

    #[test]
    fn backup_generates_todays_name() {
        let api = FakeCluster::new();
        let report = fixed(&api).backup(None).unwrap();

        assert_eq!(report.snapshot.name, "snapshot-20240326");
        assert_eq!(report.repository, "nightly");
        assert_eq!(
            api.calls(),
            vec![ApiCall::Create("nightly".into(), "snapshot-20240326".into())]
        );
    }

    #[test]
    fn backup_uses_explicit_name_and_prefix() {
        let api = FakeCluster::new();
        let lifecycle = fixed(&api).with_prefix("daily-");

        lifecycle.backup(Some("pre-upgrade")).unwrap();
        lifecycle.backup(None).unwrap();

        assert_eq!(
            api.calls(),
            vec![
                ApiCall::Create("nightly".into(), "pre-upgrade".into()),
                ApiCall::Create("nightly".into(), "daily-20240326".into()),
            ]
        );
    }

    #[test]
    fn backup_duplicate_reports_name_without_retry() {
        let api = FakeCluster::new().with_snapshots(["snapshot-20240326"]);
        let err = fixed(&api).backup(None).unwrap_err();

        match &err {
            BackupError::BackupFailed { name, .. } => assert_eq!(name, "snapshot-20240326"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            err.as_cluster().map(|c| c.kind),
            Some(ClusterErrorKind::DuplicateName)
        );
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn named_delete_never_lists() {
        let api = FakeCluster::new().with_snapshots(["snapshot-20240101"]);
        let report = fixed(&api)
            .delete(&DeleteRequest::Named("snapshot-20240101".into()))
            .unwrap();

        assert_eq!(report.deleted().collect::<Vec<_>>(), vec!["snapshot-20240101"]);
        assert!(report.cutoff.is_none());
        assert_eq!(
            api.calls(),
            vec![ApiCall::Delete("nightly".into(), "snapshot-20240101".into())]
        );
    }

    #[test]
    fn named_delete_of_missing_snapshot_fails() {
        let api = FakeCluster::new();
        let err = fixed(&api)
            .delete(&DeleteRequest::Named("snapshot-20240101".into()))
            .unwrap_err();
        assert_eq!(
            err.as_cluster().map(|c| c.kind),
            Some(ClusterErrorKind::NotFound)
        );
    }

    #[test]
    fn age_based_delete_removes_only_old_dated_snapshots() {
        let api = FakeCluster::new().with_snapshots([
            "snapshot-20240101",
            "snapshot-20240301",
            "badname",
            "snapshot-20240215",
        ]);
        let report = fixed(&api)
            .delete(&DeleteRequest::OlderThan {
                age_days: 40,
                dry_run: false,
            })
            .unwrap();

        // 2024-03-26 minus 40 days
        assert_eq!(report.cutoff, Some(ymd(2024, 2, 15)));
        assert_eq!(
            report.deleted().collect::<Vec<_>>(),
            vec!["snapshot-20240101", "snapshot-20240215"]
        );
        assert_eq!(
            api.snapshot_names(),
            vec!["snapshot-20240301".to_string(), "badname".to_string()]
        );
        assert_eq!(api.calls()[0], ApiCall::List("nightly".into()));
    }

    #[test]
    fn bulk_delete_continues_past_failures() {
        let api = FakeCluster::new()
            .with_snapshots(["snapshot-20240101", "snapshot-20240102", "snapshot-20240103"])
            .fail_delete(
                "snapshot-20240102",
                BackupError::Cluster(ClusterError {
                    status: 500,
                    reason: "repository is busy".into(),
                    kind: ClusterErrorKind::Other,
                }),
            );

        let report = fixed(&api)
            .delete(&DeleteRequest::OlderThan {
                age_days: 40,
                dry_run: false,
            })
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![
                ApiCall::List("nightly".into()),
                ApiCall::Delete("nightly".into(), "snapshot-20240101".into()),
                ApiCall::Delete("nightly".into(), "snapshot-20240102".into()),
                ApiCall::Delete("nightly".into(), "snapshot-20240103".into()),
            ]
        );
        assert_eq!(
            report.deleted().collect::<Vec<_>>(),
            vec!["snapshot-20240101", "snapshot-20240103"]
        );
        let failed: Vec<_> = report.failed().map(|o| o.name.as_str()).collect();
        assert_eq!(failed, vec!["snapshot-20240102"]);
        assert!(!report.is_success());
        assert!(matches!(
            report.into_result(),
            Err(BackupError::PartialDelete { failed: 1, total: 3 })
        ));
    }

    #[test]
    fn listing_failure_aborts_prune() {
        let api = FakeCluster::new().fail_list(BackupError::Unreachable {
            url: "http://localhost:9200/_snapshot/nightly/_all".into(),
            message: "connection refused".into(),
        });
        let err = fixed(&api)
            .delete(&DeleteRequest::OlderThan {
                age_days: 40,
                dry_run: false,
            })
            .unwrap_err();
        assert!(matches!(err, BackupError::Unreachable { .. }));
    }

    #[test]
    fn negative_age_is_rejected_before_listing() {
        let api = FakeCluster::new().with_snapshots(["snapshot-20240101"]);
        let err = fixed(&api)
            .delete(&DeleteRequest::OlderThan {
                age_days: -3,
                dry_run: false,
            })
            .unwrap_err();
        assert!(matches!(err, BackupError::InvalidArgument(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn dry_run_reports_candidates_without_deleting() {
        let api = FakeCluster::new().with_snapshots(["snapshot-20240101", "snapshot-20240320"]);
        let report = fixed(&api)
            .delete(&DeleteRequest::OlderThan {
                age_days: 40,
                dry_run: true,
            })
            .unwrap();

        assert_eq!(report.skipped, vec!["snapshot-20240101".to_string()]);
        assert!(report.outcomes.is_empty());
        assert_eq!(api.calls(), vec![ApiCall::List("nightly".into())]);
        assert_eq!(api.snapshot_names().len(), 2);
    }
}
