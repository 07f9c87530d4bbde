// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{SeededStore, days_ago, days_ahead, now};
use cadence::{RepositoryErrorKind, SchedulingRepository};
use cadence_domain::{EmployeeRole, EmployeeStatus, LeaveStatus, SchedulingPreferences};

#[test]
fn test_employee_is_loaded_with_evaluator_and_leave() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    let leave = LeaveStatus {
        is_on_leave: true,
        start_date: Some(days_ago(3)),
        end_date: Some(days_ahead(4)),
    };
    store.persistence.set_leave(store.manager_id, &leave).unwrap();

    let employee = store.persistence.employee(employee_id).unwrap();

    assert_eq!(employee.name, "Avery Adams");
    assert_eq!(employee.email.as_deref(), Some("avery.adams@example.com"));
    assert_eq!(employee.role, EmployeeRole::TeamMember);
    assert_eq!(employee.start_date, days_ago(120));
    assert!(!employee.leave.is_on_leave);
    let evaluator = employee.evaluator.unwrap();
    assert_eq!(evaluator.employee_id, store.manager_id);
    assert_eq!(evaluator.name, "Morgan Manager");
    assert_eq!(evaluator.leave, leave);
}

#[test]
fn test_cleared_evaluator_resolves_to_none() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    store.persistence.set_evaluator(employee_id, None).unwrap();

    let employee = store.persistence.employee(employee_id).unwrap();
    assert!(employee.evaluator.is_none());
}

#[test]
fn test_active_employees_skip_inactive_staff() {
    let mut store = SeededStore::new();
    let kept = store.hire("Avery Adams", 120);
    let departed = store.hire("Blake Brown", 120);
    store
        .persistence
        .set_employee_status(departed, EmployeeStatus::Inactive)
        .unwrap();

    let ids: Vec<i64> = store
        .persistence
        .active_employees(store.store_id)
        .unwrap()
        .iter()
        .map(|e| e.employee_id)
        .collect();

    assert_eq!(ids, vec![store.director_id, store.manager_id, kept]);
}

#[test]
fn test_change_logs_are_split_by_kind() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 400);
    store
        .persistence
        .record_role_change(
            employee_id,
            days_ago(10),
            Some(EmployeeRole::TeamMember),
            EmployeeRole::Leader,
        )
        .unwrap();
    store
        .persistence
        .record_store_transfer(employee_id, days_ago(60), Some(7), store.store_id)
        .unwrap();

    let employee = store.persistence.employee(employee_id).unwrap();

    assert_eq!(employee.role_history.len(), 1);
    assert_eq!(employee.role_history[0].changed_at, days_ago(10));
    assert_eq!(employee.role_history[0].previous.as_deref(), Some("team_member"));
    assert_eq!(employee.role_history[0].current, "leader");
    assert_eq!(employee.store_history.len(), 1);
    assert_eq!(employee.store_history[0].previous.as_deref(), Some("7"));
    assert_eq!(employee.store_history[0].current, store.store_id.to_string());
}

#[test]
fn test_director_and_managers_are_found() {
    let mut store = SeededStore::new();
    store.hire("Avery Adams", 120);

    let director = store.persistence.director(store.store_id).unwrap().unwrap();
    assert_eq!(director.employee_id, store.director_id);
    assert_eq!(director.role, EmployeeRole::Director);

    let managers: Vec<i64> = store
        .persistence
        .store_managers(store.store_id)
        .unwrap()
        .iter()
        .map(|m| m.employee_id)
        .collect();
    assert_eq!(managers, vec![store.director_id, store.manager_id]);
}

#[test]
fn test_inactive_director_is_not_returned() {
    let mut store = SeededStore::new();
    store
        .persistence
        .set_employee_status(store.director_id, EmployeeStatus::Inactive)
        .unwrap();
    assert!(store.persistence.director(store.store_id).unwrap().is_none());
}

#[test]
fn test_scheduling_preferences_round_trip() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    let preferences = SchedulingPreferences {
        next_evaluation_date: Some(days_ahead(48)),
        last_calculated_at: Some(now()),
    };

    store
        .persistence
        .update_scheduling_preferences(employee_id, &preferences)
        .unwrap();

    let employee = store.persistence.employee(employee_id).unwrap();
    assert_eq!(employee.scheduling_preferences, preferences);
}

#[test]
fn test_unknown_employee_maps_to_not_found() {
    let mut store = SeededStore::new();

    let err = store.persistence.employee(9999).unwrap_err();
    assert_eq!(err.kind(), RepositoryErrorKind::NotFound);

    let err = store
        .persistence
        .update_scheduling_preferences(9999, &SchedulingPreferences::default())
        .unwrap_err();
    assert_eq!(err.kind(), RepositoryErrorKind::NotFound);
}
