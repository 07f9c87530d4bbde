// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Employment status of an employee.
///
/// Only `Active` employees are considered by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for EmployeeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(DomainError::InvalidEmployeeStatus(s.to_string())),
        }
    }
}

/// Position of an employee within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    #[default]
    TeamMember,
    Trainer,
    Leader,
    Manager,
    Director,
}

impl EmployeeRole {
    /// Converts this role to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TeamMember => "team_member",
            Self::Trainer => "trainer",
            Self::Leader => "leader",
            Self::Manager => "manager",
            Self::Director => "director",
        }
    }

    /// Returns whether this role receives manager-facing notifications.
    #[must_use]
    pub const fn is_manager(&self) -> bool {
        matches!(self, Self::Manager | Self::Director)
    }
}

impl FromStr for EmployeeRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team_member" => Ok(Self::TeamMember),
            "trainer" => Ok(Self::Trainer),
            "leader" => Ok(Self::Leader),
            "manager" => Ok(Self::Manager),
            "director" => Ok(Self::Director),
            _ => Err(DomainError::InvalidEmployeeRole(s.to_string())),
        }
    }
}

/// Lifecycle status of an evaluation.
///
/// Valid progression is
/// `PendingSelfEvaluation` → `PendingManagerReview` → `InReviewSession` → `Completed`.
/// `Missed` is assigned when an overdue evaluation is superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    PendingSelfEvaluation,
    PendingManagerReview,
    InReviewSession,
    Completed,
    Missed,
}

impl EvaluationStatus {
    /// Statuses that count as an unresolved (open) evaluation.
    pub const OPEN: [Self; 3] = [
        Self::PendingSelfEvaluation,
        Self::PendingManagerReview,
        Self::InReviewSession,
    ];

    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingSelfEvaluation => "pending_self_evaluation",
            Self::PendingManagerReview => "pending_manager_review",
            Self::InReviewSession => "in_review_session",
            Self::Completed => "completed",
            Self::Missed => "missed",
        }
    }

    /// Returns whether the evaluation is still unresolved.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Completed | Self::Missed)
    }
}

impl FromStr for EvaluationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_self_evaluation" => Ok(Self::PendingSelfEvaluation),
            "pending_manager_review" => Ok(Self::PendingManagerReview),
            "in_review_session" => Ok(Self::InReviewSession),
            "completed" => Ok(Self::Completed),
            "missed" => Ok(Self::Missed),
            _ => Err(DomainError::InvalidEvaluationStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an evaluation came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingType {
    Auto,
    Manual,
}

impl SchedulingType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for SchedulingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            _ => Err(DomainError::InvalidSchedulingType(s.to_string())),
        }
    }
}

/// Where the anchor date for the next evaluation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    /// An open evaluation whose scheduled date has already passed.
    PendingEvaluation,
    /// The most recent completed evaluation.
    CompletedEvaluation,
    /// The employee has never been evaluated; the hire date is used.
    HireDate,
}

impl AnchorSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingEvaluation => "pending_evaluation",
            Self::CompletedEvaluation => "completed_evaluation",
            Self::HireDate => "hire_date",
        }
    }
}

impl FromStr for AnchorSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_evaluation" => Ok(Self::PendingEvaluation),
            "completed_evaluation" => Ok(Self::CompletedEvaluation),
            "hire_date" => Ok(Self::HireDate),
            _ => Err(DomainError::InvalidAnchorSource(s.to_string())),
        }
    }
}

impl std::fmt::Display for AnchorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leave state of an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveStatus {
    /// Whether the employee is flagged as on leave.
    pub is_on_leave: bool,
    /// When the leave started, if recorded.
    pub start_date: Option<DateTime<Utc>>,
    /// When the leave ends (or ended). `None` means open-ended.
    pub end_date: Option<DateTime<Utc>>,
}

impl LeaveStatus {
    /// Returns whether the employee is on leave at `now`.
    ///
    /// Leave with no end date, or an end date in the future, is active.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_on_leave && self.end_date.is_none_or(|end| end > now)
    }

    /// Returns when the employee came back from leave, if they have.
    #[must_use]
    pub fn returned_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.end_date.filter(|end| *end <= now)
    }
}

/// A single entry in a role or store change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the change took effect.
    pub changed_at: DateTime<Utc>,
    /// The value before the change, if known.
    pub previous: Option<String>,
    /// The value after the change.
    pub current: String,
}

/// Resolved reference to an employee's evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorRef {
    pub employee_id: i64,
    pub name: String,
    pub leave: LeaveStatus,
}

/// Last computed projection for an employee's next evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPreferences {
    pub next_evaluation_date: Option<DateTime<Utc>>,
    pub last_calculated_at: Option<DateTime<Utc>>,
}

/// An employee as seen by the scheduler, with references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The employee's canonical ID.
    pub employee_id: i64,
    /// The store (tenant) the employee belongs to.
    pub store_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: EmployeeRole,
    pub status: EmployeeStatus,
    /// Hire date.
    pub start_date: DateTime<Utc>,
    /// The assigned evaluator, `None` when unassigned or dangling.
    pub evaluator: Option<EvaluatorRef>,
    pub leave: LeaveStatus,
    /// Role changes, in any order.
    pub role_history: Vec<HistoryEntry>,
    /// Store transfers, in any order.
    pub store_history: Vec<HistoryEntry>,
    pub scheduling_preferences: SchedulingPreferences,
}

impl Employee {
    /// Returns a lightweight summary of this employee.
    #[must_use]
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            employee_id: self.employee_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Identity and contact details of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub employee_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: EmployeeRole,
}

/// Scheduling metadata attached to an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingMetadata {
    pub scheduling_type: SchedulingType,
    /// The anchor the scheduled date was computed from.
    pub base_date: DateTime<Utc>,
    pub base_date_source: AnchorSource,
}

/// A performance evaluation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub evaluation_id: i64,
    pub employee_id: i64,
    pub evaluator_id: i64,
    pub store_id: i64,
    pub template_id: i64,
    pub status: EvaluationStatus,
    pub scheduled_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub scheduling: Option<SchedulingMetadata>,
}

/// An evaluation form template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: i64,
    pub store_id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Kind of notification emitted by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent to the employee when a new evaluation is assigned to them.
    EvaluationAssigned,
    /// Sent to the store's managers when an evaluation is created.
    EvaluationCreated,
    /// Sent to the employee when an evaluation is coming due.
    EvaluationReminder,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EvaluationAssigned => "evaluation_assigned",
            Self::EvaluationCreated => "evaluation_created",
            Self::EvaluationReminder => "evaluation_reminder",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evaluation_assigned" => Ok(Self::EvaluationAssigned),
            "evaluation_created" => Ok(Self::EvaluationCreated),
            "evaluation_reminder" => Ok(Self::EvaluationReminder),
            _ => Err(DomainError::InvalidNotificationKind(s.to_string())),
        }
    }
}
