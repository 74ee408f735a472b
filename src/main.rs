//! esbackup - Elasticsearch snapshot CLI
//!
//! Create today's snapshot, or prune snapshots older than a retention window.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use esbackup::Result;
use esbackup::app::AppContext;
use esbackup::cli::Cli;
use esbackup::cli::output::emit_error;
use esbackup::config::{Config, DEFAULT_LOG_FILE};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    init_tracing(&cli, config.as_ref().ok());

    match config.and_then(|config| run(&cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            emit_error(cli.output_mode(), &e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: Config) -> Result<()> {
    let ctx = AppContext::new(cli, config)?;
    info!(
        config = %ctx.config_path.display(),
        cluster = ctx.client.base_url(),
        repository = %ctx.config.backup_repository,
        "starting"
    );
    esbackup::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli, config: Option<&Config>) {
    let level = cli
        .loglevel
        .or_else(|| config.and_then(|c| c.log_level().ok().flatten()))
        .unwrap_or_default();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let log_path = cli
        .logfile
        .clone()
        .or_else(|| config.and_then(|c| c.log_file.clone()))
        .unwrap_or_else(|| DEFAULT_LOG_FILE.into());

    let (writer, to_file) = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), true),
        Err(err) => {
            // Only complain when the path was asked for explicitly.
            if cli.logfile.is_some() {
                eprintln!(
                    "warning: cannot open log file {}: {err}; logging to stderr",
                    log_path.display()
                );
            }
            (BoxMakeWriter::new(std::io::stderr), false)
        }
    };

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_ansi(!to_file).with_writer(writer))
            .init();
    }
}
