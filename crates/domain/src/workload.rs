// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evaluator workload leveling.
//!
//! An evaluator conducts at most `MAX_EVALUATIONS_PER_DAY` evaluations per
//! store-local day. When the proposed day is full, nearby days are tried in
//! alternating order (0, +1, -1, +2, -2, ...) up to `WINDOW_DAYS` away.

use crate::error::DomainError;
use crate::timezone::{
    BusinessHours, adjust_to_business_hours, get_end_of_day, get_start_of_day, is_weekend,
    resolve_local, to_store_local_time,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;

/// Per-evaluator daily cap.
pub const MAX_EVALUATIONS_PER_DAY: usize = 3;
/// Days searched on either side of the proposed day.
pub const WINDOW_DAYS: i64 = 7;

/// Inclusive range a redistributed date must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionBounds {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

impl DistributionBounds {
    #[must_use]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.earliest <= date && date <= self.latest
    }
}

/// The UTC span covering `WINDOW_DAYS` local days on either side of `date`.
///
/// # Errors
///
/// Returns an error if the window edges cannot be resolved in `tz`.
pub fn workload_window(
    date: DateTime<Utc>,
    tz: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let span: Duration = Duration::days(WINDOW_DAYS);
    Ok((
        get_start_of_day(date - span, tz)?,
        get_end_of_day(date + span, tz)?,
    ))
}

/// Moves `proposed` to the nearest day on which the evaluator has capacity.
///
/// `existing` holds the scheduled dates of the evaluator's evaluations in the
/// surrounding window. Candidates keep the proposed local time of day, skip
/// weekends, are clamped to business hours and must fall inside `bounds`.
/// If every candidate is full, `proposed` is returned unchanged.
///
/// # Errors
///
/// Returns an error if a candidate cannot be resolved in `tz`.
pub fn distribute_workload(
    proposed: DateTime<Utc>,
    existing: &[DateTime<Utc>],
    bounds: &DistributionBounds,
    tz: Tz,
    hours: &BusinessHours,
) -> Result<DateTime<Utc>, DomainError> {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for date in existing {
        *per_day
            .entry(to_store_local_time(*date, tz).date_naive())
            .or_default() += 1;
    }

    let local = to_store_local_time(proposed, tz);
    let proposed_day: NaiveDate = local.date_naive();
    let time_of_day: NaiveTime = local.time();

    let offsets = std::iter::once(0).chain((1..=WINDOW_DAYS).flat_map(|d| [d, -d]));
    for offset in offsets {
        let day: NaiveDate = proposed_day + Duration::days(offset);
        if is_weekend(day.weekday()) {
            continue;
        }
        let candidate: DateTime<Utc> =
            adjust_to_business_hours(resolve_local(day.and_time(time_of_day), tz)?, tz, hours)?;
        if !bounds.contains(candidate) {
            continue;
        }
        let booked: usize = per_day
            .get(&to_store_local_time(candidate, tz).date_naive())
            .copied()
            .unwrap_or(0);
        if booked < MAX_EVALUATIONS_PER_DAY {
            return Ok(candidate);
        }
    }

    Ok(proposed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::timezone::parse_timezone;
    use chrono::TimeZone;

    fn tz() -> Tz {
        parse_timezone("America/New_York").unwrap()
    }

    /// Wednesday 2026-05-13 at 10:00 EDT.
    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 13, 14, 0, 0).unwrap()
    }

    fn wide_bounds() -> DistributionBounds {
        DistributionBounds {
            earliest: wednesday() - Duration::days(30),
            latest: wednesday() + Duration::days(30),
        }
    }

    fn booked(day: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        (0..count)
            .map(|i| day + Duration::hours(i64::try_from(i).unwrap()))
            .collect()
    }

    #[test]
    fn test_day_with_capacity_is_kept() {
        let existing = booked(wednesday(), 2);
        let result = distribute_workload(
            wednesday(),
            &existing,
            &wide_bounds(),
            tz(),
            &BusinessHours::default(),
        )
        .unwrap();
        assert_eq!(result, wednesday());
    }

    #[test]
    fn test_full_day_moves_forward_first() {
        let existing = booked(wednesday(), 3);
        let result = distribute_workload(
            wednesday(),
            &existing,
            &wide_bounds(),
            tz(),
            &BusinessHours::default(),
        )
        .unwrap();
        assert_eq!(result, wednesday() + Duration::days(1));
    }

    #[test]
    fn test_alternates_backward_when_forward_is_full() {
        let mut existing = booked(wednesday(), 3);
        existing.extend(booked(wednesday() + Duration::days(1), 3));
        let result = distribute_workload(
            wednesday(),
            &existing,
            &wide_bounds(),
            tz(),
            &BusinessHours::default(),
        )
        .unwrap();
        assert_eq!(result, wednesday() - Duration::days(1));
    }

    #[test]
    fn test_weekends_are_skipped() {
        let friday = wednesday() + Duration::days(2);
        let mut existing = booked(friday, 3);
        existing.extend(booked(friday - Duration::days(1), 3));
        let result = distribute_workload(
            friday,
            &existing,
            &wide_bounds(),
            tz(),
            &BusinessHours::default(),
        )
        .unwrap();
        // Saturday and Sunday are skipped; Monday is +3 and Wednesday is -2.
        assert_eq!(result, wednesday());
    }

    #[test]
    fn test_bounds_exclude_candidates() {
        let existing = booked(wednesday(), 3);
        let bounds = DistributionBounds {
            earliest: wednesday() - Duration::days(5),
            latest: wednesday(),
        };
        let result = distribute_workload(
            wednesday(),
            &existing,
            &bounds,
            tz(),
            &BusinessHours::default(),
        )
        .unwrap();
        assert_eq!(result, wednesday() - Duration::days(1));
    }

    #[test]
    fn test_saturated_window_returns_original() {
        let existing: Vec<DateTime<Utc>> = (-WINDOW_DAYS..=WINDOW_DAYS)
            .flat_map(|d| booked(wednesday() + Duration::days(d), 3))
            .collect();
        let result = distribute_workload(
            wednesday(),
            &existing,
            &wide_bounds(),
            tz(),
            &BusinessHours::default(),
        )
        .unwrap();
        assert_eq!(result, wednesday());
    }

    #[test]
    fn test_window_spans_fifteen_local_days() {
        let (start, end) = workload_window(wednesday(), tz()).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 5, 6, 4, 0, 0).unwrap());
        assert!(end > Utc.with_ymd_and_hms(2026, 5, 21, 3, 59, 0).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2026, 5, 21, 4, 0, 0).unwrap());
    }
}
