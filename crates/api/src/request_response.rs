// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use cadence::{AutoSchedulingValidation, StoreSchedulingResult};
use cadence_domain::{SETTINGS_DATE_FORMAT, SETTINGS_TIME_FORMAT, SchedulingSettings};

/// API request to update a store's scheduling settings.
///
/// Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UpdateSettingsRequest {
    /// Whether the daily run schedules this store.
    pub auto_schedule: Option<bool>,
    /// Days between evaluations (30-365).
    pub frequency_days: Option<i64>,
    /// `hire_date`, `calendar_year`, `fiscal_year` or `custom`.
    pub cycle_start: Option<String>,
    /// `immediate`, `complete_cycle` or `align_next`.
    pub transition_mode: Option<String>,
    /// `YYYY-MM-DD`; required when `cycle_start` is `custom`.
    pub custom_start_date: Option<String>,
    /// Minimum tenure in days before a first evaluation (0-365).
    pub min_employment_days: Option<i64>,
    /// Month the fiscal year starts in (1-12).
    pub fiscal_year_start_month: Option<i64>,
    /// IANA timezone name.
    pub timezone: Option<String>,
    /// `HH:MM` store-local opening time.
    pub business_hours_open: Option<String>,
    /// `HH:MM` store-local closing time.
    pub business_hours_close: Option<String>,
}

/// A store's effective scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettingsInfo {
    pub auto_schedule: bool,
    pub frequency_days: u32,
    pub cycle_start: String,
    pub transition_mode: String,
    pub custom_start_date: Option<String>,
    pub min_employment_days: u32,
    pub fiscal_year_start_month: u32,
    pub timezone: String,
    pub business_hours_open: String,
    pub business_hours_close: String,
}

impl From<&SchedulingSettings> for SettingsInfo {
    fn from(settings: &SchedulingSettings) -> Self {
        Self {
            auto_schedule: settings.auto_schedule,
            frequency_days: settings.frequency_days,
            cycle_start: settings.cycle_start.as_str().to_string(),
            transition_mode: settings.transition_mode.as_str().to_string(),
            custom_start_date: settings
                .custom_start_date
                .map(|date| date.format(SETTINGS_DATE_FORMAT).to_string()),
            min_employment_days: settings.min_employment_days,
            fiscal_year_start_month: settings.fiscal_year_start_month,
            timezone: settings.timezone.name().to_string(),
            business_hours_open: settings
                .business_hours
                .open()
                .format(SETTINGS_TIME_FORMAT)
                .to_string(),
            business_hours_close: settings
                .business_hours
                .close()
                .format(SETTINGS_TIME_FORMAT)
                .to_string(),
        }
    }
}

/// Outcome of the scheduling run triggered by enabling auto-scheduling.
///
/// A failed run never fails the settings update; `error` carries the reason.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchedulingResultsInfo {
    pub success: bool,
    pub result: Option<StoreSchedulingResult>,
    pub error: Option<String>,
}

/// API response for a settings update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UpdateSettingsResponse {
    pub store_id: i64,
    /// The settings as saved.
    pub settings: SettingsInfo,
    /// Present only when this update turned auto-scheduling on.
    pub scheduling_results: Option<SchedulingResultsInfo>,
    /// A success message.
    pub message: String,
}

/// API response describing whether a store can be auto-scheduled.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SettingsValidationResponse {
    pub store_id: i64,
    pub is_valid: bool,
    /// Problems that block scheduling.
    pub issues: Vec<String>,
    /// Problems that only affect individual employees.
    pub configuration_issues: Vec<String>,
    pub settings: SettingsInfo,
}

impl SettingsValidationResponse {
    #[must_use]
    pub fn new(store_id: i64, validation: &AutoSchedulingValidation) -> Self {
        Self {
            store_id,
            is_valid: validation.is_valid,
            issues: validation.issues.clone(),
            configuration_issues: validation.configuration_issues.clone(),
            settings: SettingsInfo::from(&validation.settings),
        }
    }
}
