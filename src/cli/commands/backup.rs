//! esbackup backup - Create one snapshot

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputMode, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::lifecycle::BackupReport;

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Snapshot name to use instead of <prefix><YYYYMMDD>
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(ctx: &AppContext, args: &BackupArgs) -> Result<()> {
    debug!(target: "backup", mode = ?ctx.output_mode, "output mode selected");
    let report = ctx.lifecycle().backup(args.name.as_deref())?;
    display(ctx, &report)
}

fn display(ctx: &AppContext, report: &BackupReport) -> Result<()> {
    match ctx.output_mode {
        OutputMode::Robot => emit_robot(&robot_ok(report)),
        OutputMode::Human => {
            let mut layout = HumanLayout::new();
            layout
                .title("Snapshot created")
                .kv("name", &report.snapshot.name)
                .kv("repository", &report.repository)
                .kv(
                    "state",
                    report.snapshot.state.as_deref().unwrap_or("unknown"),
                );
            emit_human(layout);
            Ok(())
        }
    }
}
