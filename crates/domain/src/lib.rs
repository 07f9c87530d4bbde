// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod date_calculator;
mod eligibility;
mod error;
mod priority;
mod settings;
mod timezone;
mod types;
mod workload;

#[cfg(test)]
mod tests;

pub use date_calculator::{
    ALIGN_NEXT_MAX_ITERATIONS, FIRST_EVALUATION_MAX_LEAD_DAYS, FIRST_EVALUATION_MIN_LEAD_DAYS,
    GRACE_PERIOD_DAYS, LastEvaluation, MAX_DAYS_BETWEEN, MIN_DAYS_BETWEEN, NextEvaluation,
    TRANSITION_CEILING_DAYS, TimingAnomaly, TimingValidation, TransitionOutcome,
    calculate_next_evaluation_date, fit_to_business_hours, get_last_evaluation_date,
    handle_transition_mode, validate_evaluation_timing,
};
pub use eligibility::{
    ChangeType, EligibilityDecision, EmployeeChange, IneligibilityReason, ROLE_CHANGE_WAIT_DAYS,
    TRANSFER_WAIT_DAYS, handle_employee_changes, is_employee_eligible,
};
pub use error::{DomainError, ErrorCategory};
pub use priority::{calculate_priority_score, rank_by_priority};
pub use settings::{
    CycleStart, DEFAULT_FISCAL_YEAR_START_MONTH, DEFAULT_FREQUENCY_DAYS,
    DEFAULT_MIN_EMPLOYMENT_DAYS, DEFAULT_TIMEZONE, FISCAL_YEAR_START_MONTH_RANGE,
    FREQUENCY_DAYS_RANGE, MIN_EMPLOYMENT_DAYS_RANGE, SETTINGS_DATE_FORMAT, SETTINGS_TIME_FORMAT,
    SchedulingSettings, SettingsRepair, StoredSchedulingSettings, TransitionMode, repair_settings,
};
pub use timezone::{
    BusinessHours, BusinessWindow, adjust_to_business_day, adjust_to_business_hours,
    get_end_of_day, get_start_of_day, get_store_business_hours, is_dst, is_weekend,
    is_within_business_hours, parse_timezone, resolve_local, retreat_to_business_hours,
    to_store_local_time, to_utc,
};
pub use types::{
    AnchorSource, Employee, EmployeeRole, EmployeeStatus, EmployeeSummary, Evaluation,
    EvaluationStatus, EvaluatorRef, HistoryEntry, LeaveStatus, NotificationKind,
    SchedulingMetadata, SchedulingPreferences, SchedulingType, Template,
};
pub use workload::{
    DistributionBounds, MAX_EVALUATIONS_PER_DAY, WINDOW_DAYS, distribute_workload,
    workload_window,
};

// Re-exported so downstream crates name timezones without a direct dependency.
pub use chrono_tz::Tz;
