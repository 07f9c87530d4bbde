// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Handlers are synchronous and take the persistence adapter directly; the
//! server runs them on a blocking thread.

use std::ops::RangeInclusive;
use std::str::FromStr;

use cadence::{
    AutoSchedulingValidation, EmployeeProjection, GlobalSchedulingResult, Mailer, RunSummary,
    RunTarget, Scheduler, SchedulingRepository, StoreSchedulingResult, validate_auto_scheduling,
};
use cadence_domain::{
    BusinessHours, CycleStart, FISCAL_YEAR_START_MONTH_RANGE, FREQUENCY_DAYS_RANGE,
    MIN_EMPLOYMENT_DAYS_RANGE, SETTINGS_DATE_FORMAT, SETTINGS_TIME_FORMAT, SettingsRepair,
    StoredSchedulingSettings, TransitionMode, parse_timezone, repair_settings,
};
use cadence_persistence::Persistence;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
    translate_repository_error,
};
use crate::request_response::{
    SchedulingResultsInfo, SettingsInfo, SettingsValidationResponse, UpdateSettingsRequest,
    UpdateSettingsResponse,
};

/// Updates a store's scheduling settings.
///
/// Fields absent from the request keep their current value. When the update
/// turns auto-scheduling on, the store is scheduled immediately and the
/// outcome is embedded in the response. A failed run does not fail the
/// update.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `scheduler` - The scheduler used for the follow-up run
/// * `mailer` - Email transport for assignment notices
/// * `store_id` - The store to update
/// * `request` - The fields to change
/// * `now` - The instant the follow-up run is evaluated at
///
/// # Errors
///
/// Returns an error if:
/// - The store does not exist
/// - Any field is out of range or malformed
/// - The settings cannot be loaded or saved
pub fn update_settings(
    persistence: &mut Persistence,
    scheduler: &Scheduler,
    mailer: &dyn Mailer,
    store_id: i64,
    request: &UpdateSettingsRequest,
    now: DateTime<Utc>,
) -> Result<UpdateSettingsResponse, ApiError> {
    ensure_store_exists(persistence, store_id)?;
    validate_update_request(request)?;

    let current: Option<StoredSchedulingSettings> = persistence
        .settings(store_id)
        .map_err(|e| translate_repository_error(&e))?;
    let was_enabled: bool = current
        .as_ref()
        .and_then(|stored| stored.auto_schedule)
        .unwrap_or(false);

    // Start from the repaired form so fields the request leaves alone are
    // always valid, then reject anything the request itself got wrong.
    let baseline: StoredSchedulingSettings =
        repair_settings(&current.unwrap_or_default()).settings.to_stored();
    let merged: StoredSchedulingSettings = merge_request(baseline, request);
    let repair: SettingsRepair = repair_settings(&merged);
    if repair.was_repaired() {
        return Err(ApiError::InvalidInput {
            field: String::from("settings"),
            message: repair.repairs.join("; "),
        });
    }

    persistence
        .save_settings(store_id, &repair.settings.to_stored())
        .map_err(|e| translate_repository_error(&e))?;
    info!(
        store_id,
        auto_schedule = repair.settings.auto_schedule,
        "Updated scheduling settings"
    );

    let scheduling_results: Option<SchedulingResultsInfo> =
        if !was_enabled && repair.settings.auto_schedule {
            Some(run_after_enable(persistence, scheduler, mailer, store_id, now))
        } else {
            None
        };

    Ok(UpdateSettingsResponse {
        store_id,
        settings: SettingsInfo::from(&repair.settings),
        scheduling_results,
        message: format!("Scheduling settings updated for store {store_id}"),
    })
}

/// Reports whether a store is ready for auto-scheduling.
///
/// Read-only: drifted settings are shown in repaired form but not saved.
///
/// # Errors
///
/// Returns an error if the store does not exist or its data cannot be
/// loaded.
pub fn get_settings_validation(
    persistence: &mut Persistence,
    scheduler: &Scheduler,
    store_id: i64,
) -> Result<SettingsValidationResponse, ApiError> {
    ensure_store_exists(persistence, store_id)?;
    let validation: AutoSchedulingValidation =
        validate_auto_scheduling(persistence, scheduler.retry_policy(), store_id)
            .map_err(translate_core_error)?;
    Ok(SettingsValidationResponse::new(store_id, &validation))
}

/// Runs scheduling for one store on demand.
///
/// The store is scheduled whether or not auto-scheduling is enabled.
///
/// # Errors
///
/// Returns an error if the store does not exist, lacks a template or
/// director, or is already being scheduled.
pub fn schedule_store(
    persistence: &mut Persistence,
    scheduler: &Scheduler,
    mailer: &dyn Mailer,
    store_id: i64,
    now: DateTime<Utc>,
) -> Result<StoreSchedulingResult, ApiError> {
    ensure_store_exists(persistence, store_id)?;
    match scheduler
        .run_scheduling(persistence, mailer, RunTarget::Store(store_id), now)
        .map_err(translate_core_error)?
    {
        RunSummary::Store(result) => Ok(result),
        RunSummary::All(_) => Err(ApiError::Internal {
            message: String::from("Store run returned a global summary"),
        }),
    }
}

/// Runs scheduling for every auto-scheduling store.
///
/// # Errors
///
/// Returns an error only if the list of stores cannot be loaded; failing
/// stores are reported inside the result.
pub fn schedule_all(
    persistence: &mut Persistence,
    scheduler: &Scheduler,
    mailer: &dyn Mailer,
    now: DateTime<Utc>,
) -> Result<GlobalSchedulingResult, ApiError> {
    match scheduler
        .run_scheduling(persistence, mailer, RunTarget::All, now)
        .map_err(translate_core_error)?
    {
        RunSummary::All(result) => Ok(result),
        RunSummary::Store(_) => Err(ApiError::Internal {
            message: String::from("Global run returned a store summary"),
        }),
    }
}

/// Projects an employee's next evaluation date without creating one.
///
/// The projection is saved to the employee's scheduling preferences.
///
/// # Errors
///
/// Returns an error if the employee does not exist or the date cannot be
/// computed.
pub fn calculate_next_evaluation(
    persistence: &mut Persistence,
    scheduler: &Scheduler,
    employee_id: i64,
    now: DateTime<Utc>,
) -> Result<EmployeeProjection, ApiError> {
    if persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Employee"),
            message: format!("Employee {employee_id} does not exist"),
        });
    }
    scheduler
        .calculate_employee_schedule(persistence, employee_id, now)
        .map_err(translate_core_error)
}

fn run_after_enable(
    persistence: &mut Persistence,
    scheduler: &Scheduler,
    mailer: &dyn Mailer,
    store_id: i64,
    now: DateTime<Utc>,
) -> SchedulingResultsInfo {
    match scheduler.schedule_store_evaluations(persistence, mailer, store_id, now) {
        Ok(result) => {
            info!(
                store_id,
                scheduled = result.scheduled,
                "Scheduled store after enabling auto-scheduling"
            );
            SchedulingResultsInfo {
                success: true,
                result: Some(result),
                error: None,
            }
        }
        Err(e) => {
            warn!(store_id, error = %e, "Scheduling after enabling auto-scheduling failed");
            SchedulingResultsInfo {
                success: false,
                result: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn ensure_store_exists(persistence: &mut Persistence, store_id: i64) -> Result<(), ApiError> {
    if persistence
        .store_exists(store_id)
        .map_err(translate_persistence_error)?
    {
        Ok(())
    } else {
        Err(ApiError::ResourceNotFound {
            resource_type: String::from("Store"),
            message: format!("Store {store_id} does not exist"),
        })
    }
}

fn validate_update_request(request: &UpdateSettingsRequest) -> Result<(), ApiError> {
    check_range("frequency_days", request.frequency_days, &FREQUENCY_DAYS_RANGE)?;
    check_range("min_employment_days", request.min_employment_days, &MIN_EMPLOYMENT_DAYS_RANGE)?;
    check_range(
        "fiscal_year_start_month",
        request.fiscal_year_start_month,
        &FISCAL_YEAR_START_MONTH_RANGE,
    )?;

    if let Some(raw) = request.cycle_start.as_deref() {
        CycleStart::from_str(raw).map_err(translate_domain_error)?;
    }
    if let Some(raw) = request.transition_mode.as_deref() {
        TransitionMode::from_str(raw).map_err(translate_domain_error)?;
    }
    if let Some(raw) = request.timezone.as_deref() {
        parse_timezone(raw).map_err(translate_domain_error)?;
    }
    if let Some(raw) = request.custom_start_date.as_deref() {
        NaiveDate::parse_from_str(raw, SETTINGS_DATE_FORMAT).map_err(|e| {
            ApiError::InvalidInput {
                field: String::from("custom_start_date"),
                message: format!("'{raw}' is not a YYYY-MM-DD date: {e}"),
            }
        })?;
    }

    let open: Option<NaiveTime> =
        parse_time("business_hours_open", request.business_hours_open.as_deref())?;
    let close: Option<NaiveTime> =
        parse_time("business_hours_close", request.business_hours_close.as_deref())?;
    if let (Some(open), Some(close)) = (open, close) {
        BusinessHours::new(open, close).map_err(translate_domain_error)?;
    }
    Ok(())
}

fn check_range(
    field: &str,
    value: Option<i64>,
    range: &RangeInclusive<i64>,
) -> Result<(), ApiError> {
    match value {
        Some(value) if !range.contains(&value) => Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("{value} is outside {}..={}", range.start(), range.end()),
        }),
        _ => Ok(()),
    }
}

fn parse_time(field: &str, raw: Option<&str>) -> Result<Option<NaiveTime>, ApiError> {
    raw.map(|value| {
        NaiveTime::parse_from_str(value, SETTINGS_TIME_FORMAT).map_err(|e| {
            ApiError::InvalidInput {
                field: field.to_string(),
                message: format!("'{value}' is not an HH:MM time: {e}"),
            }
        })
    })
    .transpose()
}

fn merge_request(
    mut stored: StoredSchedulingSettings,
    request: &UpdateSettingsRequest,
) -> StoredSchedulingSettings {
    if let Some(value) = request.auto_schedule {
        stored.auto_schedule = Some(value);
    }
    if let Some(value) = request.frequency_days {
        stored.frequency = Some(value);
    }
    if let Some(value) = &request.cycle_start {
        stored.cycle_start = Some(value.clone());
    }
    if let Some(value) = &request.transition_mode {
        stored.transition_mode = Some(value.clone());
    }
    if let Some(value) = &request.custom_start_date {
        stored.custom_start_date = Some(value.clone());
    }
    if let Some(value) = request.min_employment_days {
        stored.min_employment_days = Some(value);
    }
    if let Some(value) = request.fiscal_year_start_month {
        stored.fiscal_year_start_month = Some(value);
    }
    if let Some(value) = &request.timezone {
        stored.timezone = Some(value.clone());
    }
    if let Some(value) = &request.business_hours_open {
        stored.business_hours_open = Some(value.clone());
    }
    if let Some(value) = &request.business_hours_close {
        stored.business_hours_close = Some(value.clone());
    }
    stored
}
