//! Retention window arithmetic and old-snapshot selection.

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use super::Snapshot;
use super::name::parse_date;
use crate::error::{BackupError, Result};

pub const DEFAULT_RETENTION_DAYS: i64 = 40;

/// The date `age_days` calendar days before the date embedded in
/// `reference_name`. Snapshots dated on or before it are old.
pub fn cutoff_date(reference_name: &str, age_days: i64) -> Result<NaiveDate> {
    let age = u64::try_from(age_days).map_err(|_| {
        BackupError::InvalidArgument(format!("age must not be negative, got {age_days}"))
    })?;
    let reference = parse_date(reference_name)?;
    let cutoff = reference.checked_sub_days(Days::new(age)).ok_or_else(|| {
        BackupError::InvalidArgument(format!(
            "age of {age_days} days reaches before the earliest representable date"
        ))
    })?;
    debug!(reference = %reference, age_days, cutoff = %cutoff, "computed retention cutoff");
    Ok(cutoff)
}

/// Snapshots whose embedded date is on or before `cutoff`, in listing order.
///
/// Names without a parseable date are skipped.
pub fn select_old<'a, I>(snapshots: I, cutoff: NaiveDate) -> Vec<Snapshot>
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    snapshots
        .into_iter()
        .filter(|snapshot| match snapshot.embedded_date() {
            Ok(date) => {
                debug!(name = %snapshot.name, %date, old = date <= cutoff, "checked snapshot age");
                date <= cutoff
            }
            Err(err) => {
                warn!(name = %snapshot.name, "skipping undated snapshot: {err}");
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cutoff_is_forty_days_back_by_default() {
        assert_eq!(
            cutoff_date("snapshot-20240315", DEFAULT_RETENTION_DAYS).unwrap(),
            ymd(2024, 2, 4)
        );
    }

    #[test]
    fn cutoff_uses_calendar_days() {
        assert_eq!(cutoff_date("snapshot-20240301", 1).unwrap(), ymd(2024, 2, 29));
        assert_eq!(cutoff_date("snapshot-20240101", 0).unwrap(), ymd(2024, 1, 1));
        assert_eq!(cutoff_date("snapshot-20250101", 365).unwrap(), ymd(2024, 1, 2));
    }

    #[test]
    fn cutoff_rejects_negative_age() {
        let err = cutoff_date("snapshot-20240315", -1).unwrap_err();
        assert!(matches!(err, BackupError::InvalidArgument(_)), "{err:?}");
    }

    #[test]
    fn cutoff_rejects_unparseable_reference() {
        let err = cutoff_date("latest", 40).unwrap_err();
        assert!(matches!(err, BackupError::InvalidName { .. }), "{err:?}");
    }

    #[test]
    fn cutoff_rejects_age_past_date_range() {
        let err = cutoff_date("snapshot-20240315", i64::MAX).unwrap_err();
        assert!(matches!(err, BackupError::InvalidArgument(_)), "{err:?}");
    }

    #[test]
    fn select_old_skips_undated_names() {
        let listing: Vec<Snapshot> = [
            "snapshot-20240101",
            "snapshot-20240301",
            "badname",
            "snapshot-20240401",
        ]
        .into_iter()
        .map(Snapshot::new)
        .collect();

        let old = select_old(&listing, ymd(2024, 2, 15));
        let names: Vec<_> = old.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["snapshot-20240101"]);
    }

    #[test]
    fn select_old_includes_cutoff_day_and_keeps_order() {
        let listing: Vec<Snapshot> = ["snapshot-20240210", "snapshot-20240215", "snapshot-20240216", "snapshot-20240105"]
            .into_iter()
            .map(Snapshot::new)
            .collect();

        let old = select_old(&listing, ymd(2024, 2, 15));
        let names: Vec<_> = old.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["snapshot-20240210", "snapshot-20240215", "snapshot-20240105"]);
    }
}
