//! Date parsing and age bucketing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::catalog::MilestoneTable;
use crate::ScheduleError;

/// Parse a clinical date or date-time into UTC.
///
/// Accepts RFC 3339, offsets without a colon (`+0000`, as emitted by OpenMRS),
/// naive date-times (read as UTC) and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_clinical_date(value: &str) -> Result<DateTime<Utc>, ScheduleError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(ScheduleError::InvalidDate(value.to_string()))
}

/// Whole days between two instants, truncated toward zero.
pub fn elapsed_days(birth: DateTime<Utc>, event: DateTime<Utc>) -> i64 {
    event.signed_duration_since(birth).num_days()
}

/// Age in whole days at `event_date` for someone born on `birth_date`.
pub fn age_in_days(birth_date: &str, event_date: &str) -> Result<i64, ScheduleError> {
    let birth = parse_clinical_date(birth_date)?;
    let event = parse_clinical_date(event_date)?;
    Ok(elapsed_days(birth, event))
}

/// Bucket an age into the milestone with the greatest offset not after it.
///
/// Ages before the first milestone resolve to the first label and ages past
/// the last one resolve to the last label, so this never fails.
pub fn map_to_milestone(age_in_days: i64, milestones: &MilestoneTable) -> &str {
    milestones.resolve(age_in_days).label.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScheduleCatalog;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn parses_supported_date_shapes() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_clinical_date("2024-01-01").unwrap(), midnight);
        assert_eq!(parse_clinical_date("2024-01-01T00:00:00Z").unwrap(), midnight);
        assert_eq!(
            parse_clinical_date("2024-01-01T00:00:00.000+0000").unwrap(),
            midnight
        );
        assert_eq!(parse_clinical_date("2024-01-01T00:00:00").unwrap(), midnight);
        assert_eq!(
            parse_clinical_date("2024-01-01T07:00:00+07:00").unwrap(),
            midnight
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        let err = parse_clinical_date("not-a-date").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDate(ref raw) if raw == "not-a-date"));
        assert!(age_in_days("2024-01-01", "2024-13-40").is_err());
        assert!(age_in_days("", "2024-01-01").is_err());
    }

    #[test]
    fn age_truncates_partial_days() {
        assert_eq!(age_in_days("2024-01-01", "2024-01-01").unwrap(), 0);
        assert_eq!(age_in_days("2024-01-01", "2024-01-02T23:59:00Z").unwrap(), 1);
        assert_eq!(age_in_days("2024-01-01", "2024-02-12").unwrap(), 42);
        assert_eq!(age_in_days("2024-01-02", "2024-01-01T12:00:00Z").unwrap(), 0);
        assert_eq!(age_in_days("2024-01-03", "2024-01-01").unwrap(), -2);
    }

    #[test]
    fn ages_between_milestones_round_down() {
        let catalog = ScheduleCatalog::iap();
        let table = catalog.milestones();
        assert_eq!(map_to_milestone(0, table), "Birth");
        assert_eq!(map_to_milestone(41, table), "Birth");
        assert_eq!(map_to_milestone(42, table), "6 wk");
        // halfway between 6 wk (42) and 10 wk (70)
        assert_eq!(map_to_milestone(56, table), "6 wk");
        assert_eq!(map_to_milestone(300, table), "9 mo");
    }

    #[test]
    fn out_of_range_ages_resolve_to_the_edges() {
        let catalog = ScheduleCatalog::iap();
        let table = catalog.milestones();
        assert_eq!(map_to_milestone(-30, table), "Birth");
        assert_eq!(map_to_milestone(4748, table), "13-18 yr");
        assert_eq!(map_to_milestone(40_000, table), "13-18 yr");
    }

    proptest! {
        #[test]
        fn milestone_index_is_monotonic(a in -1_000i64..10_000, b in -1_000i64..10_000) {
            let catalog = ScheduleCatalog::iap();
            let table = catalog.milestones();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                table.index_for_age(low) <= table.index_for_age(high),
                "index for {} exceeded index for {}", low, high
            );
        }

        #[test]
        fn resolved_milestone_never_starts_after_the_age(age in 0i64..10_000) {
            let catalog = ScheduleCatalog::iap();
            let milestone = catalog.milestones().resolve(age);
            prop_assert!(milestone.day_offset <= age);
        }
    }
}
