// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{RecordingMailer, TestStore, now, scheduler};
use crate::{
    ApiError, UpdateSettingsRequest, UpdateSettingsResponse, get_settings_validation,
    update_settings,
};
use cadence::SchedulingRepository;

fn update(
    store: &mut TestStore,
    request: &UpdateSettingsRequest,
) -> Result<UpdateSettingsResponse, ApiError> {
    update_settings(
        &mut store.persistence,
        &scheduler(),
        &RecordingMailer::default(),
        store.store_id,
        request,
        now(),
    )
}

fn enable() -> UpdateSettingsRequest {
    UpdateSettingsRequest {
        auto_schedule: Some(true),
        ..UpdateSettingsRequest::default()
    }
}

fn invalid_field(result: Result<UpdateSettingsResponse, ApiError>) -> String {
    match result {
        Err(ApiError::InvalidInput { field, .. }) => field,
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn test_enabling_auto_schedule_runs_the_store() {
    let mut store = TestStore::new();
    store.hire("Avery Adams");

    let response = update(&mut store, &enable()).unwrap();

    assert!(response.settings.auto_schedule);
    let results = response.scheduling_results.unwrap();
    assert!(results.success);
    assert!(results.error.is_none());
    let result = results.result.unwrap();
    assert_eq!(result.total, 3);
    assert_eq!(result.scheduled, 1);
}

#[test]
fn test_failed_run_does_not_fail_the_update() {
    let mut store = TestStore::without_template();

    let response = update(&mut store, &enable()).unwrap();

    let results = response.scheduling_results.unwrap();
    assert!(!results.success);
    assert!(results.result.is_none());
    assert!(
        results
            .error
            .unwrap()
            .contains("No active evaluation template")
    );
    let saved = store.persistence.settings(store.store_id).unwrap().unwrap();
    assert_eq!(saved.auto_schedule, Some(true));
}

#[test]
fn test_update_while_enabled_does_not_run() {
    let mut store = TestStore::new();
    update(&mut store, &enable()).unwrap();
    store.hire("Avery Adams");

    let response = update(
        &mut store,
        &UpdateSettingsRequest {
            frequency_days: Some(120),
            ..UpdateSettingsRequest::default()
        },
    )
    .unwrap();

    assert!(response.scheduling_results.is_none());
    assert_eq!(response.settings.frequency_days, 120);
    assert!(store.persistence.store_evaluations(store.store_id).unwrap().is_empty());
}

#[test]
fn test_partial_update_keeps_other_fields() {
    let mut store = TestStore::new();
    update(
        &mut store,
        &UpdateSettingsRequest {
            timezone: Some(String::from("Europe/London")),
            ..UpdateSettingsRequest::default()
        },
    )
    .unwrap();

    let response = update(
        &mut store,
        &UpdateSettingsRequest {
            frequency_days: Some(60),
            ..UpdateSettingsRequest::default()
        },
    )
    .unwrap();

    assert_eq!(response.settings.timezone, "Europe/London");
    assert_eq!(response.settings.frequency_days, 60);
    assert!(!response.settings.auto_schedule);
}

#[test]
fn test_out_of_range_values_are_rejected_without_saving() {
    let mut store = TestStore::new();

    let field = invalid_field(update(
        &mut store,
        &UpdateSettingsRequest {
            frequency_days: Some(400),
            ..enable()
        },
    ));
    assert_eq!(field, "frequency_days");

    let field = invalid_field(update(
        &mut store,
        &UpdateSettingsRequest {
            fiscal_year_start_month: Some(13),
            ..UpdateSettingsRequest::default()
        },
    ));
    assert_eq!(field, "fiscal_year_start_month");

    assert!(store.persistence.settings(store.store_id).unwrap().is_none());
}

#[test]
fn test_malformed_values_name_their_field() {
    let mut store = TestStore::new();
    let cases = [
        (
            UpdateSettingsRequest {
                timezone: Some(String::from("Mars/Olympus_Mons")),
                ..UpdateSettingsRequest::default()
            },
            "timezone",
        ),
        (
            UpdateSettingsRequest {
                transition_mode: Some(String::from("whenever")),
                ..UpdateSettingsRequest::default()
            },
            "transition_mode",
        ),
        (
            UpdateSettingsRequest {
                custom_start_date: Some(String::from("01/02/2026")),
                ..UpdateSettingsRequest::default()
            },
            "custom_start_date",
        ),
        (
            UpdateSettingsRequest {
                business_hours_open: Some(String::from("9am")),
                ..UpdateSettingsRequest::default()
            },
            "business_hours_open",
        ),
        (
            UpdateSettingsRequest {
                business_hours_open: Some(String::from("18:00")),
                business_hours_close: Some(String::from("09:00")),
                ..UpdateSettingsRequest::default()
            },
            "business_hours",
        ),
    ];

    for (request, expected) in cases {
        assert_eq!(invalid_field(update(&mut store, &request)), expected);
    }
}

#[test]
fn test_merged_settings_must_stay_consistent() {
    let mut store = TestStore::new();

    // Opening after the stored 17:00 close.
    let field = invalid_field(update(
        &mut store,
        &UpdateSettingsRequest {
            business_hours_open: Some(String::from("18:00")),
            ..UpdateSettingsRequest::default()
        },
    ));
    assert_eq!(field, "settings");

    let field = invalid_field(update(
        &mut store,
        &UpdateSettingsRequest {
            cycle_start: Some(String::from("custom")),
            ..UpdateSettingsRequest::default()
        },
    ));
    assert_eq!(field, "settings");

    let response = update(
        &mut store,
        &UpdateSettingsRequest {
            cycle_start: Some(String::from("custom")),
            custom_start_date: Some(String::from("2026-01-01")),
            ..UpdateSettingsRequest::default()
        },
    )
    .unwrap();
    assert_eq!(response.settings.cycle_start, "custom");
    assert_eq!(response.settings.custom_start_date.as_deref(), Some("2026-01-01"));
}

#[test]
fn test_unknown_store_is_not_found() {
    let mut store = TestStore::new();
    let result = update_settings(
        &mut store.persistence,
        &scheduler(),
        &RecordingMailer::default(),
        999,
        &enable(),
        now(),
    );
    assert!(matches!(
        result,
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Store"
    ));
}

#[test]
fn test_request_fields_are_optional() {
    let request: UpdateSettingsRequest =
        serde_json::from_str(r#"{"auto_schedule": true, "timezone": "Europe/Paris"}"#).unwrap();
    assert_eq!(request.auto_schedule, Some(true));
    assert_eq!(request.timezone.as_deref(), Some("Europe/Paris"));
    assert!(request.frequency_days.is_none());
    assert!(request.business_hours_open.is_none());
}

#[test]
fn test_validation_reports_blocking_and_soft_issues() {
    let mut store = TestStore::without_template();

    let response =
        get_settings_validation(&mut store.persistence, &scheduler(), store.store_id).unwrap();

    assert!(!response.is_valid);
    assert_eq!(response.issues.len(), 1);
    // Neither the director nor the manager has an evaluator.
    assert_eq!(response.configuration_issues.len(), 2);
    assert_eq!(response.settings.timezone, "America/New_York");
    assert!(store.persistence.settings(store.store_id).unwrap().is_none());
}

#[test]
fn test_validation_passes_for_a_ready_store() {
    let mut store = TestStore::new();
    store.hire("Avery Adams");

    let response =
        get_settings_validation(&mut store.persistence, &scheduler(), store.store_id).unwrap();

    assert!(response.is_valid);
    assert!(response.issues.is_empty());
}
