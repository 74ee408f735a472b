//! Error types for esbackup.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackupError>;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("invalid snapshot name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cluster unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("{0}")]
    Cluster(#[from] ClusterError),

    #[error("snapshot {name} failed: {source}")]
    BackupFailed {
        name: String,
        #[source]
        source: Box<BackupError>,
    },

    #[error("{failed} of {total} snapshot deletions failed")]
    PartialDelete { failed: usize, total: usize },

    #[error("config file not found: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BackupError {
    pub(crate) fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in robot output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "invalid_name",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unreachable { .. } => "unreachable",
            Self::Cluster(err) => match err.kind {
                ClusterErrorKind::DuplicateName => "duplicate_name",
                ClusterErrorKind::NotFound => "not_found",
                ClusterErrorKind::Other => "cluster_error",
            },
            Self::BackupFailed { source, .. } => source.code(),
            Self::PartialDelete { .. } => "partial_delete",
            Self::MissingConfig(_) => "missing_config",
            Self::Config(_) | Self::Yaml(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    /// The underlying cluster error, looking through `BackupFailed`.
    #[must_use]
    pub fn as_cluster(&self) -> Option<&ClusterError> {
        match self {
            Self::Cluster(err) => Some(err),
            Self::BackupFailed { source, .. } => source.as_cluster(),
            _ => None,
        }
    }
}

/// A non-2xx answer from the snapshot API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cluster returned HTTP {status}: {reason}")]
pub struct ClusterError {
    pub status: u16,
    pub reason: String,
    pub kind: ClusterErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterErrorKind {
    DuplicateName,
    NotFound,
    Other,
}
