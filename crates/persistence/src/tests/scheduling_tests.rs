// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The scheduler running against a real database.

use super::{RecordingMailer, SeededStore, days_ahead, now, store_settings};
use cadence::{RetryPolicy, RunSummary, RunTarget, Scheduler, SchedulingRepository};
use cadence_domain::{EvaluationStatus, NotificationKind, SchedulingType};
use chrono::Duration;

fn configured_store() -> SeededStore {
    let mut store = SeededStore::new();
    store
        .persistence
        .save_settings(store.store_id, &store_settings().to_stored())
        .unwrap();
    store
}

fn scheduler() -> Scheduler {
    Scheduler::new(RetryPolicy::immediate())
}

#[test]
fn test_new_hire_is_scheduled_once() {
    let mut store = configured_store();
    let employee_id = store.hire("Avery Adams", 120);
    let mailer = RecordingMailer::default();

    let first = scheduler()
        .schedule_store_evaluations(&mut store.persistence, &mailer, store.store_id, now())
        .unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.scheduled, 1);
    assert_eq!(first.errors, 0);

    let second = scheduler()
        .schedule_store_evaluations(&mut store.persistence, &mailer, store.store_id, now())
        .unwrap();
    assert_eq!(second.scheduled, 0);

    let evaluations = store.persistence.store_evaluations(store.store_id).unwrap();
    assert_eq!(evaluations.len(), 1);
    let evaluation = &evaluations[0];
    assert_eq!(evaluation.employee_id, employee_id);
    assert_eq!(evaluation.evaluator_id, store.manager_id);
    assert_eq!(evaluation.status, EvaluationStatus::PendingSelfEvaluation);
    assert!(evaluation.scheduled_date >= days_ahead(14));
    assert!(evaluation.scheduled_date <= days_ahead(90));
    assert_eq!(
        evaluation.scheduling.as_ref().map(|m| m.scheduling_type),
        Some(SchedulingType::Auto)
    );
    assert_eq!(mailer.sent_count(), 1);
}

#[test]
fn test_scheduling_records_notifications() {
    let mut store = configured_store();
    let employee_id = store.hire("Avery Adams", 120);

    scheduler()
        .schedule_store_evaluations(
            &mut store.persistence,
            &RecordingMailer::default(),
            store.store_id,
            now(),
        )
        .unwrap();

    let assigned = store.persistence.notifications_for(employee_id).unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].kind, NotificationKind::EvaluationAssigned);
    for manager_id in [store.director_id, store.manager_id] {
        let notices = store.persistence.notifications_for(manager_id).unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NotificationKind::EvaluationCreated);
    }
}

#[test]
fn test_global_run_covers_enabled_stores() {
    let mut store = configured_store();
    store.hire("Avery Adams", 120);
    store.hire("Blake Brown", 120);

    let summary = scheduler()
        .run_scheduling(
            &mut store.persistence,
            &RecordingMailer::default(),
            RunTarget::All,
            now(),
        )
        .unwrap();
    let RunSummary::All(global) = summary else {
        panic!("expected a global summary");
    };

    assert_eq!(global.stores_processed, 1);
    assert_eq!(global.stores_failed, 0);
    assert_eq!(global.scheduled, 2);
}

#[test]
fn test_reminders_are_sent_once_a_day() {
    let mut store = configured_store();
    let employee_id = store.hire("Avery Adams", 400);
    store.record(
        employee_id,
        EvaluationStatus::PendingSelfEvaluation,
        days_ahead(3),
        None,
    );
    let mailer = RecordingMailer::default();
    let scheduler = scheduler();

    let first = scheduler
        .send_evaluation_reminders(&mut store.persistence, &mailer, now())
        .unwrap();
    assert_eq!(first.due, 1);
    assert_eq!(first.reminded, 1);
    assert_eq!(first.emailed, 1);

    let soon = scheduler
        .send_evaluation_reminders(&mut store.persistence, &mailer, now() + Duration::hours(4))
        .unwrap();
    assert_eq!(soon.suppressed, 1);
    assert_eq!(soon.reminded, 0);

    let next_day = scheduler
        .send_evaluation_reminders(&mut store.persistence, &mailer, now() + Duration::hours(25))
        .unwrap();
    assert_eq!(next_day.reminded, 1);
    assert_eq!(mailer.sent_count(), 2);
}

#[test]
fn test_projection_is_saved_on_the_employee() {
    let mut store = configured_store();
    let employee_id = store.hire("Avery Adams", 120);

    let projection = scheduler()
        .calculate_employee_schedule(&mut store.persistence, employee_id, now())
        .unwrap();

    let employee = store.persistence.employee(employee_id).unwrap();
    assert_eq!(
        employee.scheduling_preferences.next_evaluation_date,
        Some(projection.next_evaluation_date)
    );
    assert_eq!(employee.scheduling_preferences.last_calculated_at, Some(now()));
    assert!(store.persistence.store_evaluations(store.store_id).unwrap().is_empty());
}
