use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cluster::DEFAULT_PORT;
use crate::error::{BackupError, Result};
use crate::snapshot::DEFAULT_PREFIX;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/elasticsearch/backup.yaml";
pub const DEFAULT_LOG_FILE: &str = "/var/log/elasticsearch/snapshot_backup.log";

/// Contents of `backup.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub elasticsearch_host: String,
    #[serde(default = "default_port")]
    pub elasticsearch_port: u16,
    pub backup_repository: String,
    #[serde(default)]
    pub logging_level: Option<String>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_prefix")]
    pub snapshot_prefix: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Config {
    /// Where the config is read from: the explicit path, then
    /// `ESBACKUP_CONFIG`, then [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn resolve_path(explicit_path: Option<&Path>) -> PathBuf {
        explicit_path
            .map(PathBuf::from)
            .or_else(|| env_string("ESBACKUP_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit_path);
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(env_string)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BackupError::MissingConfig(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|err| BackupError::Config(format!("read config {}: {err}", path.display())))?;
        Self::from_yaml(&raw)
            .map_err(|err| BackupError::Config(format!("parse config {}: {err}", path.display())))
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Apply `ESBACKUP_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ESBACKUP_HOST") {
            self.elasticsearch_host = value;
        }
        if let Some(value) = lookup("ESBACKUP_PORT") {
            self.elasticsearch_port = value.parse::<u16>().map_err(|err| {
                BackupError::Config(format!("invalid ESBACKUP_PORT value {value}: {err}"))
            })?;
        }
        if let Some(value) = lookup("ESBACKUP_REPOSITORY") {
            self.backup_repository = value;
        }
        if let Some(value) = lookup("ESBACKUP_LOG_LEVEL") {
            self.logging_level = Some(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.elasticsearch_host.trim().is_empty() {
            return Err(BackupError::Config(
                "elasticsearch_host is empty".to_string(),
            ));
        }
        if self.backup_repository.trim().is_empty() {
            return Err(BackupError::Config(
                "backup_repository is empty".to_string(),
            ));
        }
        if self.snapshot_prefix.chars().any(|c| c.is_ascii_digit()) {
            return Err(BackupError::Config(format!(
                "snapshot_prefix {:?} must not contain digits",
                self.snapshot_prefix
            )));
        }
        self.log_level()?;
        Ok(())
    }

    /// The configured `logging_level`, if any.
    pub fn log_level(&self) -> Result<Option<LogLevel>> {
        self.logging_level
            .as_deref()
            .map(str::parse)
            .transpose()
    }
}

/// Log levels accepted by `--loglevel` and `logging_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Error
    }
}

impl FromStr for LogLevel {
    type Err = BackupError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(BackupError::Config(format!("unknown logging level {other}"))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
