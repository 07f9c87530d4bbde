// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Priority scoring for a single scheduling run.
//!
//! Scores are additive and only meaningful within one batch: they order
//! employees competing for the same evaluator calendar.

use crate::date_calculator::{GRACE_PERIOD_DAYS, LastEvaluation};
use crate::eligibility::{ChangeType, EmployeeChange, handle_employee_changes};
use crate::types::{Employee, Evaluation, EvaluationStatus};
use chrono::{DateTime, Utc};

const OVERDUE_YEAR_POINTS: u32 = 100;
const OVERDUE_ELEVEN_MONTHS_POINTS: u32 = 75;
const OVERDUE_TEN_MONTHS_POINTS: u32 = 50;
const MISSED_EVALUATION_POINTS: u32 = 25;
const FIRST_EVALUATION_POINTS: u32 = 40;
const RETURNED_FROM_LEAVE_POINTS: u32 = 30;
const RETURNED_FROM_LEAVE_WINDOW_DAYS: i64 = 30;
const TRANSFER_POINTS: u32 = 60;
const ROLE_CHANGE_POINTS: u32 = 45;
const MAX_COOL_DOWN_OVERRUN_POINTS: i64 = 30;

/// Computes the priority score for an employee.
#[must_use]
pub fn calculate_priority_score(
    employee: &Employee,
    last: &LastEvaluation,
    evaluations: &[Evaluation],
    now: DateTime<Utc>,
) -> u32 {
    let mut score: u32 = 0;

    let days_since: i64 = last.days_since(now);
    score += match days_since {
        d if d > 365 => OVERDUE_YEAR_POINTS,
        d if d > 335 => OVERDUE_ELEVEN_MONTHS_POINTS,
        d if d > 305 => OVERDUE_TEN_MONTHS_POINTS,
        _ => 0,
    };

    let missed: usize = evaluations
        .iter()
        .filter(|e| e.status == EvaluationStatus::Missed && e.scheduled_date > last.date)
        .count();
    score += MISSED_EVALUATION_POINTS.saturating_mul(u32::try_from(missed).unwrap_or(u32::MAX));

    if last.is_first_evaluation() {
        score += FIRST_EVALUATION_POINTS;
    }

    if let Some(returned) = employee.leave.returned_at(now) {
        let days_since_return: i64 = (now - returned).num_days();
        if (GRACE_PERIOD_DAYS..=RETURNED_FROM_LEAVE_WINDOW_DAYS).contains(&days_since_return) {
            score += RETURNED_FROM_LEAVE_POINTS;
        }
    }

    let change: EmployeeChange = handle_employee_changes(employee, last, now);
    if let (true, Some(change_type), Some(days_since_change), Some(wait_days)) = (
        change.requires_evaluation,
        change.change_type,
        change.days_since_change,
        change.wait_days,
    ) {
        score += match change_type {
            ChangeType::StoreTransfer => TRANSFER_POINTS,
            ChangeType::RoleChange => ROLE_CHANGE_POINTS,
        };
        let overrun: i64 = (days_since_change - wait_days).clamp(0, MAX_COOL_DOWN_OVERRUN_POINTS);
        score += u32::try_from(overrun).unwrap_or(0);
    }

    score
}

/// Orders scored items highest-first.
///
/// The sort is stable: items with equal scores keep their input order.
pub fn rank_by_priority<T>(items: &mut [(T, u32)]) {
    items.sort_by(|a, b| b.1.cmp(&a.1));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{
        AnchorSource, EmployeeRole, EmployeeStatus, HistoryEntry, LeaveStatus,
        SchedulingPreferences,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 13, 15, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn employee() -> Employee {
        Employee {
            employee_id: 7,
            store_id: 1,
            name: String::from("Test Employee"),
            email: None,
            role: EmployeeRole::TeamMember,
            status: EmployeeStatus::Active,
            start_date: days_ago(900),
            evaluator: None,
            leave: LeaveStatus::default(),
            role_history: Vec::new(),
            store_history: Vec::new(),
            scheduling_preferences: SchedulingPreferences::default(),
        }
    }

    fn completed(days: i64) -> LastEvaluation {
        LastEvaluation {
            date: days_ago(days),
            source: AnchorSource::CompletedEvaluation,
            evaluation_id: Some(1),
        }
    }

    fn missed(id: i64, days: i64) -> Evaluation {
        Evaluation {
            evaluation_id: id,
            employee_id: 7,
            evaluator_id: 2,
            store_id: 1,
            template_id: 1,
            status: EvaluationStatus::Missed,
            scheduled_date: days_ago(days),
            completed_date: None,
            scheduling: None,
        }
    }

    #[test]
    fn test_recent_evaluation_scores_zero() {
        assert_eq!(
            calculate_priority_score(&employee(), &completed(60), &[], now()),
            0
        );
    }

    #[test]
    fn test_overdue_tiers() {
        let emp = employee();
        assert_eq!(calculate_priority_score(&emp, &completed(306), &[], now()), 50);
        assert_eq!(calculate_priority_score(&emp, &completed(336), &[], now()), 75);
        assert_eq!(calculate_priority_score(&emp, &completed(366), &[], now()), 100);
    }

    #[test]
    fn test_missed_evaluations_after_anchor_add_points() {
        let emp = employee();
        let evaluations = vec![missed(2, 100), missed(3, 50), missed(4, 400)];
        assert_eq!(
            calculate_priority_score(&emp, &completed(200), &evaluations, now()),
            50
        );
    }

    #[test]
    fn test_first_evaluation_bonus() {
        let emp = employee();
        let last = LastEvaluation {
            date: days_ago(120),
            source: AnchorSource::HireDate,
            evaluation_id: None,
        };
        assert_eq!(calculate_priority_score(&emp, &last, &[], now()), 40);
    }

    #[test]
    fn test_returned_from_leave_bonus() {
        let mut emp = employee();
        emp.leave = LeaveStatus {
            is_on_leave: false,
            start_date: Some(days_ago(90)),
            end_date: Some(days_ago(20)),
        };
        assert_eq!(calculate_priority_score(&emp, &completed(60), &[], now()), 30);
        emp.leave.end_date = Some(days_ago(45));
        assert_eq!(calculate_priority_score(&emp, &completed(60), &[], now()), 0);
    }

    #[test]
    fn test_transfer_requiring_evaluation_adds_capped_overrun() {
        let mut emp = employee();
        emp.store_history.push(HistoryEntry {
            changed_at: days_ago(55),
            previous: Some(String::from("1")),
            current: String::from("2"),
        });
        // 60 for the transfer plus 10 days past the 45-day cool-down.
        assert_eq!(calculate_priority_score(&emp, &completed(100), &[], now()), 70);

        emp.store_history[0].changed_at = days_ago(95);
        assert_eq!(calculate_priority_score(&emp, &completed(100), &[], now()), 90);
    }

    #[test]
    fn test_role_change_in_cool_down_adds_nothing() {
        let mut emp = employee();
        emp.role_history.push(HistoryEntry {
            changed_at: days_ago(10),
            previous: Some(String::from("team_member")),
            current: String::from("trainer"),
        });
        assert_eq!(calculate_priority_score(&emp, &completed(100), &[], now()), 0);
    }

    #[test]
    fn test_ranking_is_stable_and_descending() {
        let mut items = vec![("a", 10), ("b", 50), ("c", 10), ("d", 50), ("e", 0)];
        rank_by_priority(&mut items);
        let order: Vec<&str> = items.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, vec!["b", "d", "a", "c", "e"]);
    }
}
