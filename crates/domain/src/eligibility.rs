// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduling eligibility and lifecycle-change detection.
//!
//! Eligibility checks run in a fixed order and the first failing check
//! determines the reported reason.

use crate::date_calculator::{GRACE_PERIOD_DAYS, LastEvaluation};
use crate::settings::SchedulingSettings;
use crate::types::{Employee, HistoryEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Days an employee must wait after a role change before being evaluated.
pub const ROLE_CHANGE_WAIT_DAYS: i64 = 30;
/// Days an employee must wait after a store transfer before being evaluated.
pub const TRANSFER_WAIT_DAYS: i64 = 45;

/// The kind of lifecycle change detected in an employee's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    RoleChange,
    StoreTransfer,
}

impl ChangeType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RoleChange => "role_change",
            Self::StoreTransfer => "store_transfer",
        }
    }

    /// Cool-down that must elapse after this change.
    #[must_use]
    pub const fn wait_days(&self) -> i64 {
        match self {
            Self::RoleChange => ROLE_CHANGE_WAIT_DAYS,
            Self::StoreTransfer => TRANSFER_WAIT_DAYS,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of inspecting an employee's role and store history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeChange {
    /// Whether a change since the anchor now calls for an evaluation.
    pub requires_evaluation: bool,
    pub change_type: Option<ChangeType>,
    pub days_since_change: Option<i64>,
    pub wait_days: Option<i64>,
}

impl EmployeeChange {
    /// Whether a change was found whose cool-down is still running.
    #[must_use]
    pub const fn in_cool_down(&self) -> bool {
        self.change_type.is_some() && !self.requires_evaluation
    }
}

/// Why an employee cannot be scheduled right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibilityReason {
    OnLeave,
    RecentlyReturnedFromLeave { days_since_return: i64 },
    NoEvaluator,
    EvaluatorOnLeave { evaluator_id: i64 },
    InsufficientTenure { days_employed: i64, required_days: u32 },
    ChangeCoolDown {
        change_type: ChangeType,
        days_since_change: i64,
        wait_days: i64,
    },
}

impl std::fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnLeave => write!(f, "Employee is currently on leave"),
            Self::RecentlyReturnedFromLeave { days_since_return } => write!(
                f,
                "Employee returned from leave {days_since_return} days ago (grace period is {GRACE_PERIOD_DAYS} days)"
            ),
            Self::NoEvaluator => write!(f, "No evaluator assigned"),
            Self::EvaluatorOnLeave { evaluator_id } => {
                write!(f, "Evaluator {evaluator_id} is currently on leave")
            }
            Self::InsufficientTenure {
                days_employed,
                required_days,
            } => write!(
                f,
                "Employee has been employed {days_employed} days; {required_days} required before a first evaluation"
            ),
            Self::ChangeCoolDown {
                change_type,
                days_since_change,
                wait_days,
            } => write!(
                f,
                "Recent {change_type} {days_since_change} days ago; waiting {wait_days} days"
            ),
        }
    }
}

/// Outcome of `is_employee_eligible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub reason: Option<IneligibilityReason>,
}

impl EligibilityDecision {
    const fn eligible() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    const fn ineligible(reason: IneligibilityReason) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// Determines whether an employee can be scheduled at `now`.
#[must_use]
pub fn is_employee_eligible(
    employee: &Employee,
    settings: &SchedulingSettings,
    last: &LastEvaluation,
    now: DateTime<Utc>,
) -> EligibilityDecision {
    if employee.leave.is_active_at(now) {
        return EligibilityDecision::ineligible(IneligibilityReason::OnLeave);
    }

    if let Some(returned) = employee.leave.returned_at(now) {
        let days_since_return: i64 = (now - returned).num_days();
        if days_since_return < GRACE_PERIOD_DAYS {
            return EligibilityDecision::ineligible(
                IneligibilityReason::RecentlyReturnedFromLeave { days_since_return },
            );
        }
    }

    let Some(evaluator) = &employee.evaluator else {
        return EligibilityDecision::ineligible(IneligibilityReason::NoEvaluator);
    };

    if evaluator.leave.is_active_at(now) {
        return EligibilityDecision::ineligible(IneligibilityReason::EvaluatorOnLeave {
            evaluator_id: evaluator.employee_id,
        });
    }

    if last.is_first_evaluation() {
        let days_employed: i64 = (now - employee.start_date).num_days();
        if days_employed < i64::from(settings.min_employment_days) {
            return EligibilityDecision::ineligible(IneligibilityReason::InsufficientTenure {
                days_employed,
                required_days: settings.min_employment_days,
            });
        }
    }

    let change: EmployeeChange = handle_employee_changes(employee, last, now);
    if let (true, Some(change_type), Some(days_since_change), Some(wait_days)) = (
        change.in_cool_down(),
        change.change_type,
        change.days_since_change,
        change.wait_days,
    ) {
        return EligibilityDecision::ineligible(IneligibilityReason::ChangeCoolDown {
            change_type,
            days_since_change,
            wait_days,
        });
    }

    EligibilityDecision::eligible()
}

/// Finds the most recent role change or store transfer after the anchor.
///
/// A transfer wins a tie with a role change made at the same instant.
#[must_use]
pub fn handle_employee_changes(
    employee: &Employee,
    last: &LastEvaluation,
    now: DateTime<Utc>,
) -> EmployeeChange {
    let latest_after = |history: &[HistoryEntry]| -> Option<DateTime<Utc>> {
        history
            .iter()
            .map(|entry| entry.changed_at)
            .filter(|changed_at| *changed_at > last.date)
            .max()
    };

    let role: Option<DateTime<Utc>> = latest_after(&employee.role_history);
    let transfer: Option<DateTime<Utc>> = latest_after(&employee.store_history);

    let (change_type, changed_at) = match (role, transfer) {
        (None, None) => return EmployeeChange::default(),
        (Some(role_at), Some(transfer_at)) if role_at > transfer_at => {
            (ChangeType::RoleChange, role_at)
        }
        (Some(role_at), None) => (ChangeType::RoleChange, role_at),
        (_, Some(transfer_at)) => (ChangeType::StoreTransfer, transfer_at),
    };

    let days_since_change: i64 = (now - changed_at).num_days();
    let wait_days: i64 = change_type.wait_days();
    EmployeeChange {
        requires_evaluation: days_since_change >= wait_days,
        change_type: Some(change_type),
        days_since_change: Some(days_since_change),
        wait_days: Some(wait_days),
    }
}
