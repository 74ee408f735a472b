//! Date-derived snapshot names.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use tracing::debug;

use crate::error::{BackupError, Result};

pub const DEFAULT_PREFIX: &str = "snapshot-";

const DATE_FORMAT: &str = "%Y%m%d";

// A run of exactly eight ASCII digits: anything longer or shorter is not a date.
static DATE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{8})(?:[^0-9]|$)").expect("valid date regex")
});

/// Name for a snapshot taken today (UTC).
#[must_use]
pub fn generate_name(prefix: &str) -> String {
    name_for_date(prefix, Utc::now().date_naive())
}

#[must_use]
pub fn name_for_date(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}{}", date.format(DATE_FORMAT))
}

/// Extract the embedded `YYYYMMDD` date from a snapshot name.
///
/// The first run of exactly eight digits is used. Names without such a run,
/// or whose run is not a calendar date, are rejected.
pub fn parse_date(name: &str) -> Result<NaiveDate> {
    if name.is_empty() {
        return Err(BackupError::invalid_name(name, "name is empty"));
    }

    let run = DATE_RUN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| BackupError::invalid_name(name, "no 8-digit date found"))?;

    let date = NaiveDate::parse_from_str(run, DATE_FORMAT).map_err(|err| {
        BackupError::invalid_name(name, format!("{run} is not a valid date: {err}"))
    })?;
    debug!(name, %date, "parsed snapshot date");
    Ok(date)
}
