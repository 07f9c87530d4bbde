// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Next-evaluation date calculation.
//!
//! This module decides when an employee's next evaluation should take place:
//!
//! 1. An anchor is selected from the employee's evaluation history
//!    (`get_last_evaluation_date`).
//! 2. A target date is derived from the anchor and the store's cycle policy
//!    (`calculate_next_evaluation_date`).
//! 3. The target is clamped against the global spacing constraints
//!    (`validate_evaluation_timing`).
//! 4. When an unresolved evaluation exists, the store's transition mode
//!    reconciles the two (`handle_transition_mode`).
//!
//! ## Invariants
//!
//! - Anchor selection is deterministic for a fixed set of evaluations
//! - Every returned date falls on a weekday within store business hours
//! - Non-first evaluations are never proposed before `anchor + MIN_DAYS_BETWEEN`
//! - No date exceeds `anchor + MAX_DAYS_BETWEEN` unless that ceiling is
//!   already in the past, in which case the date is `now + GRACE_PERIOD_DAYS`
//! - Every forced clamp is reported back to the caller for logging

use crate::error::DomainError;
use crate::settings::{CycleStart, SchedulingSettings, TransitionMode};
use crate::timezone::{
    adjust_to_business_hours, resolve_local, retreat_to_business_hours, to_store_local_time,
};
use crate::types::{AnchorSource, Employee, Evaluation, EvaluationStatus};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Minimum days between two evaluations (not applied to first evaluations).
pub const MIN_DAYS_BETWEEN: i64 = 30;
/// Maximum days between two evaluations.
pub const MAX_DAYS_BETWEEN: i64 = 365;
/// Lead time used when a forced date would otherwise lie in the past.
pub const GRACE_PERIOD_DAYS: i64 = 14;
/// Earliest a first (or catch-up) evaluation may be scheduled.
pub const FIRST_EVALUATION_MIN_LEAD_DAYS: i64 = 14;
/// Latest a first (or catch-up) evaluation may be scheduled.
pub const FIRST_EVALUATION_MAX_LEAD_DAYS: i64 = 90;
/// Hard ceiling for dates pushed out by a transition mode.
pub const TRANSITION_CEILING_DAYS: i64 = 90;
/// Maximum cycle steps taken by `align_next`.
pub const ALIGN_NEXT_MAX_ITERATIONS: u32 = 12;

/// The reference point the next evaluation is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvaluation {
    /// The anchor instant.
    pub date: DateTime<Utc>,
    /// Where the anchor came from.
    pub source: AnchorSource,
    /// The evaluation the anchor was taken from, if any.
    pub evaluation_id: Option<i64>,
}

impl LastEvaluation {
    /// Returns whether the employee has never been evaluated.
    #[must_use]
    pub fn is_first_evaluation(&self) -> bool {
        self.source == AnchorSource::HireDate
    }

    /// Whole days elapsed between the anchor and `now`.
    #[must_use]
    pub fn days_since(&self, now: DateTime<Utc>) -> i64 {
        (now - self.date).num_days()
    }
}

/// A computed next-evaluation date with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextEvaluation {
    pub date: DateTime<Utc>,
    pub base_date: DateTime<Utc>,
    pub base_date_source: AnchorSource,
    /// The cycle target had already passed, so the date was measured from
    /// `now` like a first evaluation.
    pub catch_up: bool,
}

/// A forced adjustment made while validating spacing constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimingAnomaly {
    /// The proposed interval was shorter than `MIN_DAYS_BETWEEN`.
    BelowMinimum {
        interval_days: i64,
        forced_to: DateTime<Utc>,
    },
    /// The proposed interval was longer than `MAX_DAYS_BETWEEN`.
    AboveMaximum {
        interval_days: i64,
        forced_to: DateTime<Utc>,
    },
}

impl std::fmt::Display for TimingAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BelowMinimum {
                interval_days,
                forced_to,
            } => write!(
                f,
                "interval of {interval_days} days is below the {MIN_DAYS_BETWEEN}-day minimum; forced to {}",
                forced_to.to_rfc3339()
            ),
            Self::AboveMaximum {
                interval_days,
                forced_to,
            } => write!(
                f,
                "interval of {interval_days} days exceeds the {MAX_DAYS_BETWEEN}-day maximum; forced to {}",
                forced_to.to_rfc3339()
            ),
        }
    }
}

/// Result of `validate_evaluation_timing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingValidation {
    /// The (possibly adjusted) date.
    pub date: DateTime<Utc>,
    /// The forced adjustment, if one was needed.
    pub anomaly: Option<TimingAnomaly>,
}

/// Result of reconciling a date with an unresolved evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub date: DateTime<Utc>,
    pub mode: TransitionMode,
    /// Whether the 90-day ceiling (or the iteration cap) forced the date.
    pub forced: bool,
    /// The unresolved evaluation this outcome supersedes (`immediate` only).
    pub supersedes: Option<i64>,
}

/// Selects the anchor date for an employee's next evaluation.
///
/// Precedence:
/// 1. The most recent open evaluation whose scheduled date has passed.
/// 2. The most recent completed evaluation (completed date, falling back to
///    the scheduled date).
/// 3. The employee's hire date.
///
/// Ties are broken by evaluation ID so the result does not depend on the
/// order of `evaluations`.
#[must_use]
pub fn get_last_evaluation_date(
    employee: &Employee,
    evaluations: &[Evaluation],
    now: DateTime<Utc>,
) -> LastEvaluation {
    let overdue: Option<&Evaluation> = evaluations
        .iter()
        .filter(|e| e.status.is_open() && e.scheduled_date < now)
        .max_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then(a.evaluation_id.cmp(&b.evaluation_id))
        });
    if let Some(evaluation) = overdue {
        return LastEvaluation {
            date: evaluation.scheduled_date,
            source: AnchorSource::PendingEvaluation,
            evaluation_id: Some(evaluation.evaluation_id),
        };
    }

    let completed_at = |e: &Evaluation| e.completed_date.unwrap_or(e.scheduled_date);
    let completed: Option<&Evaluation> = evaluations
        .iter()
        .filter(|e| e.status == EvaluationStatus::Completed)
        .max_by(|a, b| {
            completed_at(a)
                .cmp(&completed_at(b))
                .then(a.evaluation_id.cmp(&b.evaluation_id))
        });
    if let Some(evaluation) = completed {
        return LastEvaluation {
            date: completed_at(evaluation),
            source: AnchorSource::CompletedEvaluation,
            evaluation_id: Some(evaluation.evaluation_id),
        };
    }

    LastEvaluation {
        date: employee.start_date,
        source: AnchorSource::HireDate,
        evaluation_id: None,
    }
}

/// Computes the next evaluation date for an employee.
///
/// First evaluations (and catch-ups whose cycle target already passed) target
/// the end of the current fiscal quarter, bounded to
/// `[now + 14 days, now + 90 days]`. Later evaluations follow the store's
/// cycle policy from the anchor. The result is always clamped to business
/// hours.
///
/// # Errors
///
/// Returns an error if date arithmetic or timezone resolution fails.
pub fn calculate_next_evaluation_date(
    employee: &Employee,
    last: &LastEvaluation,
    settings: &SchedulingSettings,
    now: DateTime<Utc>,
) -> Result<NextEvaluation, DomainError> {
    // Employees added ahead of their start date are measured from that date.
    let reference: DateTime<Utc> = now.max(employee.start_date);
    let (date, catch_up): (DateTime<Utc>, bool) = if last.is_first_evaluation() {
        (first_evaluation_date(settings, reference)?, false)
    } else {
        let target: DateTime<Utc> = cycle_target(last, settings)?;
        if target < now {
            (first_evaluation_date(settings, now)?, true)
        } else {
            let fitted: DateTime<Utc> = fit_to_business_hours(
                target,
                now,
                last.date + Duration::days(MAX_DAYS_BETWEEN),
                settings,
            )?;
            (fitted, false)
        }
    };

    Ok(NextEvaluation {
        date,
        base_date: last.date,
        base_date_source: last.source,
        catch_up,
    })
}

/// Clamps a proposed date against the minimum and maximum spacing rules.
///
/// Both bounds self-heal: a too-short interval is pushed to
/// `anchor + MIN_DAYS_BETWEEN` and a too-long one is pulled to
/// `anchor + MAX_DAYS_BETWEEN`. When the forced date would lie in the past
/// it becomes `now + GRACE_PERIOD_DAYS`. The minimum does not apply to first
/// evaluations.
///
/// # Errors
///
/// Returns an error if business-hour clamping fails.
pub fn validate_evaluation_timing(
    proposed: DateTime<Utc>,
    last: &LastEvaluation,
    settings: &SchedulingSettings,
    now: DateTime<Utc>,
) -> Result<TimingValidation, DomainError> {
    let interval_days: i64 = (proposed - last.date).num_days();
    let minimum: DateTime<Utc> = last.date + Duration::days(MIN_DAYS_BETWEEN);
    let maximum: DateTime<Utc> = last.date + Duration::days(MAX_DAYS_BETWEEN);

    if !last.is_first_evaluation() && proposed < minimum {
        let forced: DateTime<Utc> = if minimum < now {
            adjust_to_business_hours(
                now + Duration::days(GRACE_PERIOD_DAYS),
                settings.timezone,
                &settings.business_hours,
            )?
        } else {
            fit_to_business_hours(minimum, minimum, maximum, settings)?
        };
        return Ok(TimingValidation {
            date: forced,
            anomaly: Some(TimingAnomaly::BelowMinimum {
                interval_days,
                forced_to: forced,
            }),
        });
    }

    if interval_days > MAX_DAYS_BETWEEN {
        let forced: DateTime<Utc> = if maximum < now {
            adjust_to_business_hours(
                now + Duration::days(GRACE_PERIOD_DAYS),
                settings.timezone,
                &settings.business_hours,
            )?
        } else {
            let floor: DateTime<Utc> = if last.is_first_evaluation() {
                now
            } else {
                minimum.max(now)
            };
            fit_to_business_hours(maximum, floor, maximum, settings)?
        };
        return Ok(TimingValidation {
            date: forced,
            anomaly: Some(TimingAnomaly::AboveMaximum {
                interval_days,
                forced_to: forced,
            }),
        });
    }

    Ok(TimingValidation {
        date: proposed,
        anomaly: None,
    })
}

/// Reconciles a computed date with an employee's unresolved evaluation.
///
/// - `immediate`: the date is used unchanged and the open evaluation is
///   superseded.
/// - `complete_cycle`: the date moves to the open evaluation's scheduled date
///   plus one frequency.
/// - `align_next`: the date advances in frequency steps (at most 12) until it
///   lands strictly after the open evaluation's scheduled date.
///
/// Dates pushed past `now + TRANSITION_CEILING_DAYS` are forced back to that
/// ceiling. Dates that would land in the past move to
/// `now + GRACE_PERIOD_DAYS`.
#[must_use]
pub fn handle_transition_mode(
    existing: Option<&Evaluation>,
    settings: &SchedulingSettings,
    next_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> TransitionOutcome {
    let mode: TransitionMode = settings.transition_mode;
    let Some(existing) = existing else {
        return TransitionOutcome {
            date: next_date,
            mode,
            forced: false,
            supersedes: None,
        };
    };

    let frequency: Duration = Duration::days(i64::from(settings.frequency_days));
    let ceiling: DateTime<Utc> = now + Duration::days(TRANSITION_CEILING_DAYS);

    let (candidate, cap_hit): (DateTime<Utc>, bool) = match mode {
        TransitionMode::Immediate => {
            return TransitionOutcome {
                date: next_date,
                mode,
                forced: false,
                supersedes: Some(existing.evaluation_id),
            };
        }
        TransitionMode::CompleteCycle => (existing.scheduled_date + frequency, false),
        TransitionMode::AlignNext => {
            let mut date: DateTime<Utc> = next_date;
            let mut iterations: u32 = 0;
            while date <= existing.scheduled_date && iterations < ALIGN_NEXT_MAX_ITERATIONS {
                date += frequency;
                iterations += 1;
            }
            (date, date <= existing.scheduled_date)
        }
    };

    if cap_hit || candidate > ceiling {
        return TransitionOutcome {
            date: ceiling,
            mode,
            forced: true,
            supersedes: None,
        };
    }

    let date: DateTime<Utc> = if candidate < now {
        now + Duration::days(GRACE_PERIOD_DAYS)
    } else {
        candidate
    };
    TransitionOutcome {
        date,
        mode,
        forced: false,
        supersedes: None,
    }
}

/// Clamps `date` into business hours while keeping it inside `[floor, ceiling]`.
///
/// Forward adjustment is preferred; when that would cross the ceiling the
/// date retreats to the latest earlier business instant instead. If the
/// bounds leave no business instant, the forward adjustment wins.
///
/// # Errors
///
/// Returns an error if business-hour clamping fails.
pub fn fit_to_business_hours(
    date: DateTime<Utc>,
    floor: DateTime<Utc>,
    ceiling: DateTime<Utc>,
    settings: &SchedulingSettings,
) -> Result<DateTime<Utc>, DomainError> {
    let tz = settings.timezone;
    let hours = &settings.business_hours;
    if floor > ceiling {
        return adjust_to_business_hours(date.max(floor), tz, hours);
    }
    let candidate: DateTime<Utc> = date.clamp(floor, ceiling);
    let forward: DateTime<Utc> = adjust_to_business_hours(candidate, tz, hours)?;
    if forward <= ceiling {
        return Ok(forward);
    }
    let backward: DateTime<Utc> = retreat_to_business_hours(candidate, tz, hours)?;
    if backward >= floor {
        Ok(backward)
    } else {
        Ok(forward)
    }
}

/// Target for a first (or catch-up) evaluation.
fn first_evaluation_date(
    settings: &SchedulingSettings,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    let tz = settings.timezone;
    let floor: DateTime<Utc> = now + Duration::days(FIRST_EVALUATION_MIN_LEAD_DAYS);
    let ceiling: DateTime<Utc> = now + Duration::days(FIRST_EVALUATION_MAX_LEAD_DAYS);

    let today: NaiveDate = to_store_local_time(now, tz).date_naive();
    let mut quarter_end: NaiveDate = fiscal_quarter_end(today, settings.fiscal_year_start_month)?;
    let mut boundary: DateTime<Utc> =
        resolve_local(quarter_end.and_time(settings.business_hours.open()), tz)?;
    if boundary - now < Duration::days(FIRST_EVALUATION_MIN_LEAD_DAYS) {
        let next_quarter_day: NaiveDate =
            quarter_end
                .succ_opt()
                .ok_or_else(|| DomainError::DateArithmeticOverflow {
                    operation: format!("rolling past quarter end {quarter_end}"),
                })?;
        quarter_end = fiscal_quarter_end(next_quarter_day, settings.fiscal_year_start_month)?;
        boundary = resolve_local(quarter_end.and_time(settings.business_hours.open()), tz)?;
    }

    let target: DateTime<Utc> = boundary.min(ceiling).max(floor);
    fit_to_business_hours(target, floor, ceiling, settings)
}

/// Target from the store's cycle policy, before any clamping.
fn cycle_target(
    last: &LastEvaluation,
    settings: &SchedulingSettings,
) -> Result<DateTime<Utc>, DomainError> {
    let frequency_days: i64 = i64::from(settings.frequency_days);
    let tz = settings.timezone;
    let anchor_local: NaiveDate = to_store_local_time(last.date, tz).date_naive();

    let origin: NaiveDate = match (settings.cycle_start, settings.custom_start_date) {
        (CycleStart::HireDate, _) | (CycleStart::Custom, None) => {
            return Ok(last.date + Duration::days(frequency_days));
        }
        (CycleStart::CalendarYear, _) => first_of_month(anchor_local.year(), 1)?,
        (CycleStart::FiscalYear, _) => {
            let start_month: u32 = settings.fiscal_year_start_month;
            let year: i32 = if anchor_local.month() >= start_month {
                anchor_local.year()
            } else {
                anchor_local.year() - 1
            };
            first_of_month(year, start_month)?
        }
        (CycleStart::Custom, Some(custom)) => custom,
    };

    let threshold: NaiveDate = anchor_local + Duration::days(MIN_DAYS_BETWEEN);
    let steps: i64 = (threshold - origin).num_days().div_euclid(frequency_days) + 1;
    let boundary: NaiveDate = origin + Duration::days(steps * frequency_days);
    resolve_local(boundary.and_time(settings.business_hours.open()), tz)
}

/// Last day of the fiscal quarter containing `day`.
fn fiscal_quarter_end(day: NaiveDate, fiscal_start_month: u32) -> Result<NaiveDate, DomainError> {
    let offset: u32 = (day.month() + 12 - fiscal_start_month) % 12;
    let months_to_quarter_end: u32 = (offset / 3) * 3 + 2 - offset;
    let zero_based: u32 = day.month0() + months_to_quarter_end;
    let year: i32 = day.year() + i32::try_from(zero_based / 12).unwrap_or(0);
    let month: u32 = zero_based % 12 + 1;
    let (next_year, next_month): (i32, u32) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(next_year, next_month)?
        .pred_opt()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("computing end of month {year}-{month:02}"),
        })
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| DomainError::DateArithmeticOverflow {
        operation: format!("building date {year}-{month:02}-01"),
    })
}
