// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{SeededStore, days_ago, days_ahead, now};
use cadence::{NewEvaluation, NewNotification, RepositoryErrorKind, SchedulingRepository};
use cadence_domain::{AnchorSource, EvaluationStatus, NotificationKind, SchedulingType};
use chrono::{DateTime, Duration, Utc};

fn scheduled(store: &SeededStore, employee_id: i64, date: DateTime<Utc>) -> NewEvaluation {
    NewEvaluation {
        employee_id,
        evaluator_id: store.manager_id,
        store_id: store.store_id,
        template_id: store.template_id,
        scheduled_date: date,
        base_date: days_ago(120),
        base_date_source: AnchorSource::HireDate,
    }
}

#[test]
fn test_created_evaluation_carries_scheduling_metadata() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    let new_evaluation = scheduled(&store, employee_id, days_ahead(48));

    let created = store.persistence.create_evaluation(&new_evaluation).unwrap();

    assert_eq!(created.employee_id, employee_id);
    assert_eq!(created.status, EvaluationStatus::PendingSelfEvaluation);
    assert_eq!(created.scheduled_date, days_ahead(48));
    assert!(created.completed_date.is_none());
    let metadata = created.scheduling.unwrap();
    assert_eq!(metadata.scheduling_type, SchedulingType::Auto);
    assert_eq!(metadata.base_date, days_ago(120));
    assert_eq!(metadata.base_date_source, AnchorSource::HireDate);
}

#[test]
fn test_manual_records_have_no_metadata() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 400);
    let recorded = store.record(
        employee_id,
        EvaluationStatus::Completed,
        days_ago(200),
        Some(days_ago(198)),
    );
    assert!(recorded.scheduling.is_none());
    assert_eq!(recorded.completed_date, Some(days_ago(198)));
}

#[test]
fn test_second_open_evaluation_is_a_conflict() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    store
        .persistence
        .create_evaluation(&scheduled(&store, employee_id, days_ahead(48)))
        .unwrap();

    let err = store
        .persistence
        .create_evaluation(&scheduled(&store, employee_id, days_ahead(60)))
        .unwrap_err();

    assert_eq!(err.kind(), RepositoryErrorKind::Conflict);
    assert_eq!(
        store
            .persistence
            .evaluations_for_employee(employee_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_closed_evaluations_do_not_block_a_new_one() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 400);
    store.record(
        employee_id,
        EvaluationStatus::Completed,
        days_ago(300),
        Some(days_ago(298)),
    );
    let overdue = store.record(
        employee_id,
        EvaluationStatus::PendingManagerReview,
        days_ago(30),
        None,
    );
    store
        .persistence
        .update_evaluation_status(overdue.evaluation_id, EvaluationStatus::Missed, now())
        .unwrap();

    let created = store
        .persistence
        .create_evaluation(&scheduled(&store, employee_id, days_ahead(14)));
    assert!(created.is_ok());
}

#[test]
fn test_completing_an_evaluation_stamps_completion() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    let created = store
        .persistence
        .create_evaluation(&scheduled(&store, employee_id, days_ahead(48)))
        .unwrap();

    store
        .persistence
        .update_evaluation_status(created.evaluation_id, EvaluationStatus::Completed, now())
        .unwrap();

    let history = store.persistence.evaluations_for_employee(employee_id).unwrap();
    assert_eq!(history[0].status, EvaluationStatus::Completed);
    assert_eq!(history[0].completed_date, Some(now()));
}

#[test]
fn test_status_update_of_unknown_evaluation_is_not_found() {
    let mut store = SeededStore::new();
    let err = store
        .persistence
        .update_evaluation_status(4242, EvaluationStatus::Missed, now())
        .unwrap_err();
    assert_eq!(err.kind(), RepositoryErrorKind::NotFound);
}

#[test]
fn test_evaluator_calendar_is_bounded_inclusively() {
    let mut store = SeededStore::new();
    for (name, offset) in [("Avery Adams", 10), ("Blake Brown", 20), ("Casey Cole", 40)] {
        let employee_id = store.hire(name, 400);
        store
            .persistence
            .create_evaluation(&scheduled(&store, employee_id, days_ahead(offset)))
            .unwrap();
    }

    let within: Vec<DateTime<Utc>> = store
        .persistence
        .evaluations_for_evaluator_between(
            store.manager_id,
            store.store_id,
            days_ahead(10),
            days_ahead(30),
        )
        .unwrap()
        .iter()
        .map(|e| e.scheduled_date)
        .collect();
    assert_eq!(within, vec![days_ahead(10), days_ahead(20)]);

    let other_store = store
        .persistence
        .evaluations_for_evaluator_between(store.manager_id, 999, days_ago(1), days_ahead(60))
        .unwrap();
    assert!(other_store.is_empty());
}

#[test]
fn test_open_evaluations_due_before_ignore_closed_ones() {
    let mut store = SeededStore::new();
    let open_id = store.hire("Avery Adams", 400);
    let closed_id = store.hire("Blake Brown", 400);
    let later_id = store.hire("Casey Cole", 400);
    store.record(open_id, EvaluationStatus::InReviewSession, days_ahead(2), None);
    store.record(
        closed_id,
        EvaluationStatus::Completed,
        days_ahead(1),
        Some(days_ahead(1)),
    );
    store.record(later_id, EvaluationStatus::PendingSelfEvaluation, days_ahead(30), None);

    let due = store
        .persistence
        .open_evaluations_due_before(days_ahead(7))
        .unwrap();

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].employee_id, open_id);
}

#[test]
fn test_timestamps_are_stored_at_second_precision() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    let precise = days_ahead(48) + Duration::milliseconds(750);

    let created = store
        .persistence
        .create_evaluation(&scheduled(&store, employee_id, precise))
        .unwrap();

    assert_eq!(created.scheduled_date, days_ahead(48));
}

#[test]
fn test_latest_notification_is_per_kind() {
    let mut store = SeededStore::new();
    let employee_id = store.hire("Avery Adams", 120);
    let evaluation = store.record(
        employee_id,
        EvaluationStatus::PendingSelfEvaluation,
        days_ahead(3),
        None,
    );
    for (kind, created_at) in [
        (NotificationKind::EvaluationReminder, days_ago(2)),
        (NotificationKind::EvaluationReminder, days_ago(1)),
        (NotificationKind::EvaluationAssigned, now()),
    ] {
        store
            .persistence
            .create_notification(&NewNotification {
                recipient_id: employee_id,
                evaluation_id: Some(evaluation.evaluation_id),
                kind,
                message: String::from("Reminder"),
                created_at,
            })
            .unwrap();
    }

    let latest = store
        .persistence
        .latest_notification(evaluation.evaluation_id, NotificationKind::EvaluationReminder)
        .unwrap();
    assert_eq!(latest, Some(days_ago(1)));

    let none = store
        .persistence
        .latest_notification(evaluation.evaluation_id, NotificationKind::EvaluationCreated)
        .unwrap();
    assert!(none.is_none());

    assert_eq!(store.persistence.notifications_for(employee_id).unwrap().len(), 3);
}
