//! Blocking HTTP client for the `_snapshot` endpoints.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{CreatedSnapshot, SnapshotApi};
use crate::config::Config;
use crate::error::{BackupError, ClusterError, ClusterErrorKind, Result};
use crate::snapshot::Snapshot;

pub const DEFAULT_PORT: u16 = 9200;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `GET /_snapshot/{repository}/_all`.
#[derive(Debug, Deserialize)]
struct SnapshotListing {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

/// Body of a completed `PUT /_snapshot/{repository}/{name}`.
#[derive(Debug, Deserialize)]
struct CreateResponse {
    snapshot: Option<CreatedDetail>,
}

#[derive(Debug, Deserialize)]
struct CreatedDetail {
    state: Option<String>,
}

/// Client for one cluster node.
pub struct ClusterClient {
    base_url: String,
    client: Client,
}

impl ClusterClient {
    /// Client for `host:port`. A host without a scheme is reached over plain HTTP.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(BackupError::Config(
                "elasticsearch host is empty; set elasticsearch_host".to_string(),
            ));
        }
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}:{port}")
        } else {
            format!("http://{host}:{port}")
        };
        // Snapshot creation blocks until the cluster finishes, so only the
        // connect phase is bounded.
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| BackupError::Config(format!("elasticsearch http client: {err}")))?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.elasticsearch_host, config.elasticsearch_port)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn snapshot_url(&self, repository: &str, name: &str) -> String {
        format!(
            "{}/_snapshot/{}/{}",
            self.base_url,
            urlencoding::encode(repository),
            urlencoding::encode(name)
        )
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        debug!(url, "sending snapshot request");
        let response = request.send().map_err(|err| BackupError::Unreachable {
            url: url.to_string(),
            message: err.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // A failure to read the error body still leaves the status to report.
        let body = response.text().unwrap_or_default();
        Err(cluster_error(status, &body).into())
    }
}

impl SnapshotApi for ClusterClient {
    fn list_snapshots(&self, repository: &str) -> Result<Vec<Snapshot>> {
        let url = self.snapshot_url(repository, "_all");
        let response = self.send(self.client.get(&url), &url)?;
        let listing: SnapshotListing = serde_json::from_str(&read_body(response, &url)?)?;
        info!(
            repository,
            count = listing.snapshots.len(),
            "retrieved snapshot listing"
        );
        Ok(listing.snapshots)
    }

    fn create_snapshot(&self, repository: &str, name: &str) -> Result<CreatedSnapshot> {
        let url = format!(
            "{}?wait_for_completion=true",
            self.snapshot_url(repository, name)
        );
        let response = self.send(self.client.put(&url), &url)?;
        let body = read_body(response, &url)?;
        let state = serde_json::from_str::<CreateResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.snapshot)
            .and_then(|detail| detail.state);
        info!(repository, name, state = ?state, "snapshot created");
        Ok(CreatedSnapshot {
            name: name.to_string(),
            state,
        })
    }

    fn delete_snapshot(&self, repository: &str, name: &str) -> Result<()> {
        let url = self.snapshot_url(repository, name);
        self.send(self.client.delete(&url), &url)?;
        info!(repository, name, "snapshot deleted");
        Ok(())
    }
}

fn read_body(response: Response, url: &str) -> Result<String> {
    response.text().map_err(|err| BackupError::Unreachable {
        url: url.to_string(),
        message: format!("reading response body: {err}"),
    })
}

/// Build a [`ClusterError`] from a non-2xx response.
///
/// `reason` comes from the body's `error.reason` when present, otherwise the
/// status line text.
fn cluster_error(status: StatusCode, body: &str) -> ClusterError {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").cloned());
    let field = |key: &str| {
        error
            .as_ref()
            .and_then(|e| e.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let reason = field("reason").unwrap_or_else(|| status.to_string());
    let error_type = field("type").unwrap_or_default();

    let kind = if status == StatusCode::NOT_FOUND || error_type == "snapshot_missing_exception" {
        ClusterErrorKind::NotFound
    } else if error_type == "snapshot_name_already_in_use_exception"
        || reason.contains("already exists")
    {
        ClusterErrorKind::DuplicateName
    } else {
        ClusterErrorKind::Other
    };

    ClusterError {
        status: status.as_u16(),
        reason,
        kind,
    }
}
