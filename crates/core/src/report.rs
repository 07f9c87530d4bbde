// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Run summaries returned by the scheduler.

use cadence_domain::{AnchorSource, TimingAnomaly};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An evaluation created during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledDetail {
    pub employee_id: i64,
    pub employee_name: String,
    pub evaluation_id: i64,
    pub evaluator_id: i64,
    pub scheduled_date: DateTime<Utc>,
    pub base_date: DateTime<Utc>,
    pub base_date_source: AnchorSource,
    pub priority_score: u32,
    /// Set when spacing rules forced the date.
    pub anomaly: Option<TimingAnomaly>,
    /// The overdue evaluation marked missed in favor of this one.
    pub superseded_evaluation_id: Option<i64>,
}

/// An employee left unscheduled, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDetail {
    pub employee_id: i64,
    pub employee_name: String,
    pub reason: String,
    /// Date recorded in the employee's preferences instead of scheduling.
    pub projected_date: Option<DateTime<Utc>>,
}

/// An employee whose processing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub employee_id: i64,
    pub employee_name: String,
    pub error: String,
    pub category: String,
}

/// Outcome of scheduling one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSchedulingResult {
    pub store_id: i64,
    pub total: usize,
    pub scheduled: usize,
    pub skipped: usize,
    pub errors: usize,
    pub scheduled_details: Vec<ScheduledDetail>,
    pub skipped_details: Vec<SkippedDetail>,
    pub error_details: Vec<ErrorDetail>,
    /// Soft configuration issues found before the run.
    pub configuration_issues: Vec<String>,
    /// Notes for settings repaired before the run.
    pub settings_repairs: Vec<String>,
}

impl StoreSchedulingResult {
    pub(crate) const fn new(store_id: i64) -> Self {
        Self {
            store_id,
            total: 0,
            scheduled: 0,
            skipped: 0,
            errors: 0,
            scheduled_details: Vec::new(),
            skipped_details: Vec::new(),
            error_details: Vec::new(),
            configuration_issues: Vec::new(),
            settings_repairs: Vec::new(),
        }
    }

    pub(crate) fn record_scheduled(&mut self, detail: ScheduledDetail) {
        self.scheduled += 1;
        self.scheduled_details.push(detail);
    }

    pub(crate) fn record_skipped(&mut self, detail: SkippedDetail) {
        self.skipped += 1;
        self.skipped_details.push(detail);
    }

    pub(crate) fn record_error(&mut self, detail: ErrorDetail) {
        self.errors += 1;
        self.error_details.push(detail);
    }
}

/// Result for one store inside a global run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreOutcome {
    Completed(StoreSchedulingResult),
    Failed { store_id: i64, error: String },
}

/// Outcome of scheduling every auto-scheduling store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalSchedulingResult {
    pub stores_processed: usize,
    pub stores_failed: usize,
    pub total: usize,
    pub scheduled: usize,
    pub skipped: usize,
    pub errors: usize,
    pub stores: Vec<StoreOutcome>,
}

impl GlobalSchedulingResult {
    pub(crate) fn absorb(&mut self, outcome: StoreOutcome) {
        match &outcome {
            StoreOutcome::Completed(result) => {
                self.stores_processed += 1;
                self.total += result.total;
                self.scheduled += result.scheduled;
                self.skipped += result.skipped;
                self.errors += result.errors;
            }
            StoreOutcome::Failed { .. } => self.stores_failed += 1,
        }
        self.stores.push(outcome);
    }
}

/// What a trigger asked the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    Store(i64),
    All,
}

/// Result of a `run_scheduling` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunSummary {
    Store(StoreSchedulingResult),
    All(GlobalSchedulingResult),
}

/// Projection computed for a single employee without creating an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeProjection {
    pub employee_id: i64,
    pub next_evaluation_date: DateTime<Utc>,
    pub base_date: DateTime<Utc>,
    pub base_date_source: AnchorSource,
    pub anomaly: Option<TimingAnomaly>,
    pub calculated_at: DateTime<Utc>,
}

/// Outcome of a reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderSummary {
    pub due: usize,
    pub reminded: usize,
    pub emailed: usize,
    pub suppressed: usize,
    pub failed: usize,
}
