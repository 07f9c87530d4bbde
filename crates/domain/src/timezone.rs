// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store-local time conversions and business-hour normalization.
//!
//! Every store declares an IANA timezone. Scheduling decisions (weekday,
//! business hours, calendar-day buckets) are made in that zone, while all
//! instants are stored and compared in UTC.
//!
//! ## Invariants
//!
//! - `to_utc(to_store_local_time(d, tz)) == d` for every instant and zone
//! - Business hours are the half-open local interval `[open, close)`
//! - Saturday and Sunday are never business days
//! - Ambiguous local times (DST fall-back) resolve to the earliest instant
//! - Non-existent local times (DST spring-forward gap) shift forward by the
//!   length of the gap

use crate::error::DomainError;
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Local opening and closing times of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl BusinessHours {
    /// Creates validated business hours.
    ///
    /// # Errors
    ///
    /// Returns an error if `open` is not strictly before `close`.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, DomainError> {
        if open >= close {
            return Err(DomainError::InvalidBusinessHours {
                open: open.to_string(),
                close: close.to_string(),
            });
        }
        Ok(Self { open, close })
    }

    /// Opening time (inclusive).
    #[must_use]
    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    /// Closing time (exclusive).
    #[must_use]
    pub const fn close(&self) -> NaiveTime {
        self.close
    }

    /// Returns whether a local time-of-day falls inside the business window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.open && time < self.close
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// UTC instants bounding a store's business hours on one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Parses an IANA timezone name.
///
/// # Errors
///
/// Returns an error if the name is not a known zone.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Converts a UTC instant into the store's local time.
#[must_use]
pub fn to_store_local_time(date: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    date.with_timezone(&tz)
}

/// Converts a store-local instant back to UTC.
#[must_use]
pub fn to_utc(local: DateTime<Tz>) -> DateTime<Utc> {
    local.with_timezone(&Utc)
}

/// Resolves a wall-clock time in the store's zone to a UTC instant.
///
/// # Errors
///
/// Returns an error if the wall-clock time cannot be mapped to any instant,
/// even after shifting past a DST gap.
pub fn resolve_local(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(to_utc(dt)),
        LocalResult::None => {
            // Reading the time with the offset in force before the gap lands
            // past the transition, shifted forward by the gap's length.
            let before: i32 = tz
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix()
                .local_minus_utc();
            let shifted: DateTime<Utc> =
                Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(before))));
            if tz.from_utc_datetime(&shifted.naive_utc()).naive_local() > local {
                Ok(shifted)
            } else {
                Err(DomainError::TimezoneConversion {
                    operation: format!("resolving local time {local} in {tz}"),
                })
            }
        }
    }
}

/// Returns the UTC instant of local midnight on the date's store-local day.
///
/// # Errors
///
/// Returns an error if local midnight cannot be resolved.
pub fn get_start_of_day(date: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
    let day: NaiveDate = to_store_local_time(date, tz).date_naive();
    resolve_local(day.and_time(NaiveTime::MIN), tz)
}

/// Returns the UTC instant of the last millisecond of the store-local day.
///
/// # Errors
///
/// Returns an error if the end of day cannot be resolved.
pub fn get_end_of_day(date: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
    let day: NaiveDate = to_store_local_time(date, tz).date_naive();
    let last: NaiveTime = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).ok_or_else(|| {
        DomainError::TimezoneConversion {
            operation: String::from("building end-of-day time"),
        }
    })?;
    resolve_local(day.and_time(last), tz)
}

/// Returns whether daylight-saving time is in effect at `date` in `tz`.
///
/// The January and July offsets of the date's year form the baseline; zones
/// where they agree never observe DST.
#[must_use]
pub fn is_dst(date: DateTime<Utc>, tz: Tz) -> bool {
    let year: i32 = to_store_local_time(date, tz).year();
    let offset_at = |month: u32| -> Option<i32> {
        let naive = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN);
        Some(tz.offset_from_utc_datetime(&naive).fix().local_minus_utc())
    };
    let (Some(january), Some(july)) = (offset_at(1), offset_at(7)) else {
        return false;
    };
    if january == july {
        return false;
    }
    let standard: i32 = january.min(july);
    let current: i32 = tz
        .offset_from_utc_datetime(&date.naive_utc())
        .fix()
        .local_minus_utc();
    current > standard
}

/// Returns the UTC bounds of the store's business hours on the date's local day.
///
/// # Errors
///
/// Returns an error if either boundary cannot be resolved.
pub fn get_store_business_hours(
    date: DateTime<Utc>,
    tz: Tz,
    hours: &BusinessHours,
) -> Result<BusinessWindow, DomainError> {
    let day: NaiveDate = to_store_local_time(date, tz).date_naive();
    Ok(BusinessWindow {
        start: resolve_local(day.and_time(hours.open()), tz)?,
        end: resolve_local(day.and_time(hours.close()), tz)?,
    })
}

/// Returns whether a weekday is a weekend day.
#[must_use]
pub const fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Moves a weekend date to the following Monday, keeping the local time-of-day.
///
/// # Errors
///
/// Returns an error if date arithmetic or local resolution fails.
pub fn adjust_to_business_day(date: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
    let local = to_store_local_time(date, tz);
    if !is_weekend(local.weekday()) {
        return Ok(date);
    }
    let monday: NaiveDate = next_weekday(local.date_naive())?;
    resolve_local(monday.and_time(local.time()), tz)
}

/// Returns whether an instant falls on a weekday within business hours.
#[must_use]
pub fn is_within_business_hours(date: DateTime<Utc>, tz: Tz, hours: &BusinessHours) -> bool {
    let local = to_store_local_time(date, tz);
    !is_weekend(local.weekday()) && hours.contains(local.time())
}

/// Returns the earliest business instant at or after `date`.
///
/// Times before opening move to opening; times at or after closing move to
/// the next day's opening; weekends move to Monday.
///
/// # Errors
///
/// Returns an error if date arithmetic or local resolution fails.
pub fn adjust_to_business_hours(
    date: DateTime<Utc>,
    tz: Tz,
    hours: &BusinessHours,
) -> Result<DateTime<Utc>, DomainError> {
    if is_within_business_hours(date, tz, hours) {
        return Ok(date);
    }
    let local = to_store_local_time(date, tz);
    let mut day: NaiveDate = local.date_naive();
    let time: NaiveTime = if local.time() < hours.open() {
        hours.open()
    } else if local.time() >= hours.close() {
        day = succ(day)?;
        hours.open()
    } else {
        local.time()
    };
    if is_weekend(day.weekday()) {
        day = next_weekday(day)?;
    }
    resolve_local(day.and_time(time), tz)
}

/// Returns the latest business instant at or before `date`.
///
/// Used when a ceiling must not be exceeded. Anything outside business hours
/// moves to the opening time of the nearest earlier (or same) weekday whose
/// opening has already passed.
///
/// # Errors
///
/// Returns an error if date arithmetic or local resolution fails.
pub fn retreat_to_business_hours(
    date: DateTime<Utc>,
    tz: Tz,
    hours: &BusinessHours,
) -> Result<DateTime<Utc>, DomainError> {
    if is_within_business_hours(date, tz, hours) {
        return Ok(date);
    }
    let local = to_store_local_time(date, tz);
    let mut day: NaiveDate = local.date_naive();
    if is_weekend(day.weekday()) || local.time() < hours.open() {
        day = pred(day)?;
        while is_weekend(day.weekday()) {
            day = pred(day)?;
        }
    }
    let resolved = resolve_local(day.and_time(hours.open()), tz)?;
    // A DST gap can push the opening forward past `date`; fall back a day.
    if resolved > date {
        return retreat_to_business_hours(resolved - Duration::days(1), tz, hours);
    }
    Ok(resolved)
}

/// Returns the first weekday strictly after `day` when `day` is a weekend,
/// otherwise `day` itself.
fn next_weekday(day: NaiveDate) -> Result<NaiveDate, DomainError> {
    let mut current: NaiveDate = day;
    while is_weekend(current.weekday()) {
        current = succ(current)?;
    }
    Ok(current)
}

fn succ(day: NaiveDate) -> Result<NaiveDate, DomainError> {
    day.succ_opt()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("advancing past {day}"),
        })
}

fn pred(day: NaiveDate) -> Result<NaiveDate, DomainError> {
    day.pred_opt()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("stepping back from {day}"),
        })
}
