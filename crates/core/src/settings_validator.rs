// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pre-run validation of a store's scheduling configuration.

use crate::error::{CoreError, ErrorContext};
use crate::repository::SchedulingRepository;
use crate::retry::{RetryPolicy, with_retry};
use cadence_domain::{
    Employee, EmployeeSummary, SchedulingSettings, SettingsRepair, Template, repair_settings,
};
use tracing::{info, warn};

/// Outcome of `validate_and_repair_settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsValidation {
    pub is_valid: bool,
    pub was_repaired: bool,
    pub repairs: Vec<String>,
    pub settings: SchedulingSettings,
    pub template: Template,
    pub director: EmployeeSummary,
}

/// Outcome of `validate_auto_scheduling`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSchedulingValidation {
    /// False only when the store cannot be scheduled at all.
    pub is_valid: bool,
    /// Blocking problems.
    pub issues: Vec<String>,
    /// Non-blocking problems, such as employees without an evaluator.
    pub configuration_issues: Vec<String>,
    pub settings: SchedulingSettings,
}

/// Loads a store's settings, repairing and persisting any drift.
///
/// Missing settings are created with defaults. Fails when the store has no
/// active template or no director.
///
/// # Errors
///
/// Returns `CoreError::NoActiveTemplate` or `CoreError::NoDirector` for
/// unmet preconditions, or a repository error.
pub fn validate_and_repair_settings<R>(
    repo: &mut R,
    retry: &RetryPolicy,
    store_id: i64,
) -> Result<SettingsValidation, CoreError>
where
    R: SchedulingRepository + ?Sized,
{
    let stored = with_retry(retry, "load settings", || repo.settings(store_id))
        .map_err(CoreError::repository(
            ErrorContext::new("loading settings").with_store(store_id),
        ))?;

    let repair: SettingsRepair = match stored {
        Some(stored) => repair_settings(&stored),
        None => SettingsRepair {
            settings: SchedulingSettings::default(),
            repairs: vec![String::from("No settings found; created defaults")],
        },
    };

    if repair.was_repaired() {
        let to_save = repair.settings.to_stored();
        with_retry(retry, "save settings", || repo.save_settings(store_id, &to_save))
            .map_err(CoreError::repository(
                ErrorContext::new("saving repaired settings").with_store(store_id),
            ))?;
        for note in &repair.repairs {
            warn!(store_id, repair = %note, "Repaired scheduling setting");
        }
        info!(
            store_id,
            repairs = repair.repairs.len(),
            "Persisted repaired scheduling settings"
        );
    }

    let template: Template = with_retry(retry, "load template", || repo.active_template(store_id))
        .map_err(CoreError::repository(
            ErrorContext::new("loading active template").with_store(store_id),
        ))?
        .ok_or(CoreError::NoActiveTemplate { store_id })?;

    let director: EmployeeSummary = with_retry(retry, "load director", || repo.director(store_id))
        .map_err(CoreError::repository(
            ErrorContext::new("loading director").with_store(store_id),
        ))?
        .ok_or(CoreError::NoDirector { store_id })?;

    let was_repaired: bool = repair.was_repaired();
    Ok(SettingsValidation {
        is_valid: true,
        was_repaired,
        repairs: repair.repairs,
        settings: repair.settings,
        template,
        director,
    })
}

/// Checks whether a store is ready for automatic scheduling.
///
/// Read-only: drifted settings are reported through their repaired form but
/// not written back.
///
/// # Errors
///
/// Returns a repository error if loading fails.
pub fn validate_auto_scheduling<R>(
    repo: &mut R,
    retry: &RetryPolicy,
    store_id: i64,
) -> Result<AutoSchedulingValidation, CoreError>
where
    R: SchedulingRepository + ?Sized,
{
    let context = || ErrorContext::new("validating auto scheduling").with_store(store_id);

    let stored = with_retry(retry, "load settings", || repo.settings(store_id))
        .map_err(CoreError::repository(context()))?
        .unwrap_or_default();
    let settings: SchedulingSettings = repair_settings(&stored).settings;

    let mut issues: Vec<String> = Vec::new();
    let template = with_retry(retry, "load template", || repo.active_template(store_id))
        .map_err(CoreError::repository(context()))?;
    if template.is_none() {
        issues.push(CoreError::NoActiveTemplate { store_id }.to_string());
    }

    let employees: Vec<Employee> =
        with_retry(retry, "load employees", || repo.active_employees(store_id))
            .map_err(CoreError::repository(context()))?;
    let configuration_issues: Vec<String> = employees
        .iter()
        .filter(|employee| employee.evaluator.is_none())
        .map(|employee| {
            format!(
                "Employee {} ({}) has no evaluator assigned",
                employee.name, employee.employee_id
            )
        })
        .collect();

    Ok(AutoSchedulingValidation {
        is_valid: issues.is_empty(),
        issues,
        configuration_issues,
        settings,
    })
}
