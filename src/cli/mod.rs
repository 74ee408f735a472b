//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::LogLevel;
pub use commands::Commands;
pub use output::OutputMode;

#[derive(Parser, Debug)]
#[command(
    name = "esbackup",
    version,
    about = "Create and prune date-named Elasticsearch snapshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the YAML config file [default: /etc/elasticsearch/backup.yaml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub logfile: Option<PathBuf>,

    /// Log level; overrides logging_level from the config file
    #[arg(long, global = true, value_enum, ignore_case = true)]
    pub loglevel: Option<LogLevel>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub robot: bool,
}

impl Cli {
    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        if self.robot {
            OutputMode::Robot
        } else {
            OutputMode::Human
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::snapshot::DEFAULT_RETENTION_DAYS;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_backup_with_name_and_globals() {
        let cli = Cli::try_parse_from([
            "esbackup",
            "backup",
            "--name",
            "pre-upgrade",
            "--config",
            "/tmp/backup.yaml",
            "--loglevel",
            "WARNING",
        ])
        .unwrap();

        let Commands::Backup(args) = &cli.command else {
            panic!("expected backup, got {:?}", cli.command);
        };
        assert_eq!(args.name.as_deref(), Some("pre-upgrade"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/backup.yaml")));
        assert_eq!(cli.loglevel, Some(LogLevel::Warning));
        assert!(matches!(cli.output_mode(), OutputMode::Human));
    }

    #[test]
    fn delete_defaults_to_forty_days() {
        let cli = Cli::try_parse_from(["esbackup", "delete"]).unwrap();
        let Commands::Delete(args) = &cli.command else {
            panic!("expected delete");
        };
        assert_eq!(args.age, DEFAULT_RETENTION_DAYS);
        assert!(args.name.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn delete_accepts_negative_age_for_later_validation() {
        let cli = Cli::try_parse_from(["esbackup", "delete", "--age", "-5"]).unwrap();
        let Commands::Delete(args) = &cli.command else {
            panic!("expected delete");
        };
        assert_eq!(args.age, -5);
    }

    #[test]
    fn rejects_unknown_function_and_backup_age() {
        assert!(Cli::try_parse_from(["esbackup", "restore"]).is_err());
        assert!(Cli::try_parse_from(["esbackup", "backup", "--age", "3"]).is_err());
        assert!(Cli::try_parse_from(["esbackup", "delete", "--loglevel", "TRACE"]).is_err());
    }

    #[test]
    fn dry_run_conflicts_with_name() {
        assert!(
            Cli::try_parse_from(["esbackup", "delete", "--name", "x", "--dry-run"]).is_err()
        );
    }
}
