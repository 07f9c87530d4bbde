// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The storage seam the scheduler runs against.
//!
//! Implementations return fully-resolved value objects: employees arrive with
//! their evaluator (and the evaluator's leave status) already attached.

use cadence_domain::{
    AnchorSource, Employee, EmployeeSummary, Evaluation, EvaluationStatus, NotificationKind,
    SchedulingPreferences, StoredSchedulingSettings, Template,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Broad class of a repository failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// The requested record does not exist.
    NotFound,
    /// A uniqueness constraint rejected the write.
    Conflict,
    /// The backing store could not be reached or is busy.
    Unavailable,
    /// A query failed to execute.
    Query,
}

impl RepositoryErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Query => "query",
        }
    }
}

/// A failure reported by a `SchedulingRepository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    kind: RepositoryErrorKind,
    message: String,
}

impl RepositoryError {
    #[must_use]
    pub fn new(kind: RepositoryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::Conflict, message)
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::Unavailable, message)
    }

    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::Query, message)
    }

    #[must_use]
    pub const fn kind(&self) -> RepositoryErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for RepositoryError {}

/// An evaluation about to be created by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvaluation {
    pub employee_id: i64,
    pub evaluator_id: i64,
    pub store_id: i64,
    pub template_id: i64,
    pub scheduled_date: DateTime<Utc>,
    pub base_date: DateTime<Utc>,
    pub base_date_source: AnchorSource,
}

/// An in-app notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub evaluation_id: Option<i64>,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Storage operations required by the scheduler.
///
/// Every method takes `&mut self` so implementations can hold a single
/// connection without interior mutability.
pub trait SchedulingRepository {
    /// IDs of stores with auto-scheduling enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn auto_schedule_stores(&mut self) -> Result<Vec<i64>, RepositoryError>;

    /// Active employees of a store, ordered by employee ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn active_employees(&mut self, store_id: i64) -> Result<Vec<Employee>, RepositoryError>;

    /// A single employee by ID.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the employee does not exist.
    fn employee(&mut self, employee_id: i64) -> Result<Employee, RepositoryError>;

    /// All evaluations of an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn evaluations_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<Evaluation>, RepositoryError>;

    /// Evaluations conducted by an evaluator in a store within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn evaluations_for_evaluator_between(
        &mut self,
        evaluator_id: i64,
        store_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Evaluation>, RepositoryError>;

    /// Open evaluations across all stores scheduled at or before `before`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn open_evaluations_due_before(
        &mut self,
        before: DateTime<Utc>,
    ) -> Result<Vec<Evaluation>, RepositoryError>;

    /// The stored settings of a store, if any were ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn settings(&mut self, store_id: i64)
    -> Result<Option<StoredSchedulingSettings>, RepositoryError>;

    /// Inserts or replaces the settings of a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save_settings(
        &mut self,
        store_id: i64,
        settings: &StoredSchedulingSettings,
    ) -> Result<(), RepositoryError>;

    /// The most recently created active template of a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn active_template(&mut self, store_id: i64) -> Result<Option<Template>, RepositoryError>;

    /// The active director of a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn director(&mut self, store_id: i64) -> Result<Option<EmployeeSummary>, RepositoryError>;

    /// Active managers and directors of a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn store_managers(&mut self, store_id: i64) -> Result<Vec<EmployeeSummary>, RepositoryError>;

    /// Creates an evaluation in `pending_self_evaluation` with auto scheduling
    /// metadata.
    ///
    /// # Errors
    ///
    /// Returns a `Conflict` error if the employee already has an open
    /// evaluation.
    fn create_evaluation(&mut self, evaluation: &NewEvaluation)
    -> Result<Evaluation, RepositoryError>;

    /// Sets the status of an evaluation.
    ///
    /// `at` is recorded as the completion date when `status` is `Completed`.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the evaluation does not exist.
    fn update_evaluation_status(
        &mut self,
        evaluation_id: i64,
        status: EvaluationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Writes an employee's projected scheduling data.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the employee does not exist.
    fn update_scheduling_preferences(
        &mut self,
        employee_id: i64,
        preferences: &SchedulingPreferences,
    ) -> Result<(), RepositoryError>;

    /// Records an in-app notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn create_notification(&mut self, notification: &NewNotification)
    -> Result<(), RepositoryError>;

    /// When the latest notification of `kind` about an evaluation was sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn latest_notification(
        &mut self,
        evaluation_id: i64,
        kind: NotificationKind,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError>;
}
