//! Snapshot naming and retention.
//!
//! Snapshot names embed their creation date (`snapshot-20240315`); the
//! retention rules only ever look at that embedded date.

pub mod name;
pub mod retention;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use name::{DEFAULT_PREFIX, generate_name, name_for_date, parse_date};
pub use retention::{DEFAULT_RETENTION_DAYS, cutoff_date, select_old};

/// A snapshot as listed by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "snapshot")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Snapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: None,
        }
    }

    /// Date embedded in the snapshot name.
    pub fn embedded_date(&self) -> Result<NaiveDate> {
        parse_date(&self.name)
    }
}
