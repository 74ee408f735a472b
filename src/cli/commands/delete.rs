//! esbackup delete - Delete a named snapshot or prune old ones

use clap::Args;
use serde::Serialize;
use tracing::{debug, warn};

use crate::app::AppContext;
use crate::cli::output::{
    HumanLayout, OutputMode, emit_human, emit_robot, robot_ok, robot_partial,
};
use crate::error::Result;
use crate::lifecycle::{DeleteReport, DeleteRequest};
use crate::snapshot::DEFAULT_RETENTION_DAYS;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Delete only this snapshot (no listing, --age is ignored)
    #[arg(long)]
    pub name: Option<String>,

    /// Delete snapshots dated this many days before today or earlier
    #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS, allow_negative_numbers = true)]
    pub age: i64,

    /// Dry run - show what would be deleted
    #[arg(long, conflicts_with = "name")]
    pub dry_run: bool,
}

impl DeleteArgs {
    #[must_use]
    pub fn request(&self) -> DeleteRequest {
        match &self.name {
            Some(name) => DeleteRequest::Named(name.clone()),
            None => DeleteRequest::OlderThan {
                age_days: self.age,
                dry_run: self.dry_run,
            },
        }
    }
}

pub fn run(ctx: &AppContext, args: &DeleteArgs) -> Result<()> {
    if args.name.is_some() && args.age != DEFAULT_RETENTION_DAYS {
        warn!(age = args.age, "--age is ignored when --name is given");
    }
    let request = args.request();
    debug!(target: "delete", ?request, mode = ?ctx.output_mode, "running delete");

    let report = ctx.lifecycle().delete(&request)?;
    display(ctx, &report)?;
    report.into_result().map(|_| ())
}

/// Serializable delete report for robot output
#[derive(Debug, Serialize)]
struct DeleteSummary<'a> {
    repository: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cutoff: Option<String>,
    deleted: Vec<&'a str>,
    failed: Vec<FailedDelete<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    would_delete: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct FailedDelete<'a> {
    name: &'a str,
    code: &'static str,
    message: String,
}

impl<'a> From<&'a DeleteReport> for DeleteSummary<'a> {
    fn from(report: &'a DeleteReport) -> Self {
        Self {
            repository: &report.repository,
            cutoff: report.cutoff.map(|date| date.to_string()),
            deleted: report.deleted().collect(),
            failed: report
                .failed()
                .filter_map(|outcome| {
                    outcome.result.as_ref().err().map(|err| FailedDelete {
                        name: &outcome.name,
                        code: err.code(),
                        message: err.to_string(),
                    })
                })
                .collect(),
            would_delete: report.skipped.iter().map(String::as_str).collect(),
        }
    }
}

fn display(ctx: &AppContext, report: &DeleteReport) -> Result<()> {
    let summary = DeleteSummary::from(report);
    match ctx.output_mode {
        OutputMode::Robot => {
            let completed = summary.deleted.len();
            let failed = summary.failed.len();
            if failed == 0 {
                emit_robot(&robot_ok(summary))
            } else {
                emit_robot(&robot_partial(summary, completed, failed))
            }
        }
        OutputMode::Human => {
            emit_human(human_layout(&summary));
            Ok(())
        }
    }
}

fn human_layout(summary: &DeleteSummary<'_>) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Snapshot deletion");
    layout.kv("repository", summary.repository);
    if let Some(cutoff) = &summary.cutoff {
        layout.kv("cutoff", cutoff);
    }

    if !summary.would_delete.is_empty() {
        layout.blank().section("Would delete (dry run)");
        for name in &summary.would_delete {
            layout.bullet(name);
        }
    }
    if !summary.deleted.is_empty() {
        layout.blank().section("Deleted");
        for name in &summary.deleted {
            layout.bullet(name);
        }
    }
    if !summary.failed.is_empty() {
        layout.blank().section("Failed");
        for failure in &summary.failed {
            layout.bullet(&format!("{}: {}", failure.name, failure.message));
        }
    }
    if summary.deleted.is_empty() && summary.failed.is_empty() && summary.would_delete.is_empty() {
        layout.blank().bullet("no snapshots matched");
    }
    layout
}
