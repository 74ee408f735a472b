//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod backup;
pub mod delete;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a snapshot named after today's UTC date
    Backup(backup::BackupArgs),

    /// Delete one snapshot, or every snapshot older than --age days
    Delete(delete::DeleteArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Backup(args) => backup::run(ctx, args),
        Commands::Delete(args) => delete::run(ctx, args),
    }
}
