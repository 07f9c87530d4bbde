// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store scheduling configuration and its repair rules.
//!
//! Settings are stored loosely typed so that drift (missing fields, stale
//! enum values, out-of-range numbers) can be represented and repaired. The
//! repair step never fails: every invalid field is replaced by its documented
//! default and a human-readable note is recorded.
//!
//! ## Defaults
//!
//! | Field | Default | Valid range |
//! |---|---|---|
//! | `auto_schedule` | `false` | bool |
//! | `frequency` | 90 days | 30..=365 |
//! | `cycle_start` | `hire_date` | `hire_date`, `calendar_year`, `fiscal_year`, `custom` |
//! | `transition_mode` | `complete_cycle` | `immediate`, `complete_cycle`, `align_next` |
//! | `min_employment_days` | 90 | 0..=365 |
//! | `fiscal_year_start_month` | 1 | 1..=12 |
//! | `timezone` | `America/New_York` | IANA zone |
//! | business hours | 09:00-17:00 | open < close |

use crate::error::DomainError;
use crate::timezone::{BusinessHours, parse_timezone};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const DEFAULT_FREQUENCY_DAYS: u32 = 90;
pub const DEFAULT_MIN_EMPLOYMENT_DAYS: u32 = 90;
pub const DEFAULT_FISCAL_YEAR_START_MONTH: u32 = 1;
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

pub const FREQUENCY_DAYS_RANGE: RangeInclusive<i64> = 30..=365;
pub const MIN_EMPLOYMENT_DAYS_RANGE: RangeInclusive<i64> = 0..=365;
pub const FISCAL_YEAR_START_MONTH_RANGE: RangeInclusive<i64> = 1..=12;
pub const SETTINGS_TIME_FORMAT: &str = "%H:%M";
pub const SETTINGS_DATE_FORMAT: &str = "%Y-%m-%d";

/// Policy that decides where evaluation cycles are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStart {
    /// Cycles run from each employee's own last evaluation.
    #[default]
    HireDate,
    /// Cycles are aligned to January 1.
    CalendarYear,
    /// Cycles are aligned to the first day of the fiscal year.
    FiscalYear,
    /// Cycles are aligned to a store-defined date.
    Custom,
}

impl CycleStart {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HireDate => "hire_date",
            Self::CalendarYear => "calendar_year",
            Self::FiscalYear => "fiscal_year",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for CycleStart {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hire_date" => Ok(Self::HireDate),
            "calendar_year" => Ok(Self::CalendarYear),
            "fiscal_year" => Ok(Self::FiscalYear),
            "custom" => Ok(Self::Custom),
            _ => Err(DomainError::InvalidCycleStart(s.to_string())),
        }
    }
}

/// What to do when an employee still has an unresolved evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Supersede the outstanding evaluation and schedule right away.
    Immediate,
    /// Wait for the outstanding evaluation's cycle to finish.
    #[default]
    CompleteCycle,
    /// Align to the next cycle boundary after the outstanding evaluation.
    AlignNext,
}

impl TransitionMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::CompleteCycle => "complete_cycle",
            Self::AlignNext => "align_next",
        }
    }
}

impl FromStr for TransitionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Self::Immediate),
            "complete_cycle" => Ok(Self::CompleteCycle),
            "align_next" => Ok(Self::AlignNext),
            _ => Err(DomainError::InvalidTransitionMode(s.to_string())),
        }
    }
}

/// Validated scheduling configuration for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingSettings {
    pub auto_schedule: bool,
    /// Days between evaluations.
    pub frequency_days: u32,
    pub cycle_start: CycleStart,
    pub transition_mode: TransitionMode,
    /// Origin of cycles when `cycle_start` is `Custom`.
    pub custom_start_date: Option<NaiveDate>,
    /// Minimum tenure before a first evaluation.
    pub min_employment_days: u32,
    /// Month (1-12) the fiscal year starts in.
    pub fiscal_year_start_month: u32,
    pub timezone: Tz,
    pub business_hours: BusinessHours,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            auto_schedule: false,
            frequency_days: DEFAULT_FREQUENCY_DAYS,
            cycle_start: CycleStart::default(),
            transition_mode: TransitionMode::default(),
            custom_start_date: None,
            min_employment_days: DEFAULT_MIN_EMPLOYMENT_DAYS,
            fiscal_year_start_month: DEFAULT_FISCAL_YEAR_START_MONTH,
            timezone: parse_timezone(DEFAULT_TIMEZONE).unwrap_or(Tz::UTC),
            business_hours: BusinessHours::default(),
        }
    }
}

impl SchedulingSettings {
    /// Converts these settings to their stored representation.
    #[must_use]
    pub fn to_stored(&self) -> StoredSchedulingSettings {
        StoredSchedulingSettings {
            auto_schedule: Some(self.auto_schedule),
            frequency: Some(i64::from(self.frequency_days)),
            cycle_start: Some(self.cycle_start.as_str().to_string()),
            transition_mode: Some(self.transition_mode.as_str().to_string()),
            custom_start_date: self
                .custom_start_date
                .map(|d| d.format(SETTINGS_DATE_FORMAT).to_string()),
            min_employment_days: Some(i64::from(self.min_employment_days)),
            fiscal_year_start_month: Some(i64::from(self.fiscal_year_start_month)),
            timezone: Some(self.timezone.name().to_string()),
            business_hours_open: Some(
                self.business_hours.open().format(SETTINGS_TIME_FORMAT).to_string(),
            ),
            business_hours_close: Some(
                self.business_hours.close().format(SETTINGS_TIME_FORMAT).to_string(),
            ),
        }
    }
}

/// Scheduling configuration exactly as stored, possibly drifted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSchedulingSettings {
    pub auto_schedule: Option<bool>,
    pub frequency: Option<i64>,
    pub cycle_start: Option<String>,
    pub transition_mode: Option<String>,
    /// ISO date (`YYYY-MM-DD`).
    pub custom_start_date: Option<String>,
    pub min_employment_days: Option<i64>,
    pub fiscal_year_start_month: Option<i64>,
    pub timezone: Option<String>,
    /// Local time (`HH:MM`).
    pub business_hours_open: Option<String>,
    /// Local time (`HH:MM`).
    pub business_hours_close: Option<String>,
}

/// Outcome of repairing stored settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRepair {
    /// The guaranteed-valid settings.
    pub settings: SchedulingSettings,
    /// One note per repaired field, in field order.
    pub repairs: Vec<String>,
}

impl SettingsRepair {
    /// Returns whether any field had to be repaired.
    #[must_use]
    pub fn was_repaired(&self) -> bool {
        !self.repairs.is_empty()
    }
}

/// Repairs stored settings to a guaranteed-valid configuration.
///
/// Never fails; each missing or invalid field is reset to its default and a
/// note describing the repair is appended.
#[must_use]
pub fn repair_settings(stored: &StoredSchedulingSettings) -> SettingsRepair {
    let defaults: SchedulingSettings = SchedulingSettings::default();
    let mut repairs: Vec<String> = Vec::new();

    let auto_schedule: bool = stored.auto_schedule.unwrap_or_else(|| {
        repairs.push(String::from("autoSchedule was missing; set to false"));
        defaults.auto_schedule
    });

    let frequency_days: u32 = match stored.frequency {
        Some(days) if FREQUENCY_DAYS_RANGE.contains(&days) => u32::try_from(days)
            .unwrap_or(defaults.frequency_days),
        Some(days) => {
            repairs.push(format!(
                "frequency {days} is outside {}..={} days; reset to {}",
                FREQUENCY_DAYS_RANGE.start(),
                FREQUENCY_DAYS_RANGE.end(),
                defaults.frequency_days
            ));
            defaults.frequency_days
        }
        None => {
            repairs.push(format!(
                "frequency was missing; set to {} days",
                defaults.frequency_days
            ));
            defaults.frequency_days
        }
    };

    let mut cycle_start: CycleStart = parse_or_repair(
        stored.cycle_start.as_deref(),
        "cycleStart",
        defaults.cycle_start,
        CycleStart::as_str,
        &mut repairs,
    );

    let transition_mode: TransitionMode = parse_or_repair(
        stored.transition_mode.as_deref(),
        "transitionMode",
        defaults.transition_mode,
        TransitionMode::as_str,
        &mut repairs,
    );

    let custom_start_date: Option<NaiveDate> = match stored.custom_start_date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, SETTINGS_DATE_FORMAT).map_or_else(
            |_| {
                repairs.push(format!("customStartDate '{raw}' is not a valid date; cleared"));
                None
            },
            Some,
        ),
        None => None,
    };
    if cycle_start == CycleStart::Custom && custom_start_date.is_none() {
        repairs.push(String::from(
            "cycleStart 'custom' requires customStartDate; reset to hire_date",
        ));
        cycle_start = CycleStart::HireDate;
    }

    let min_employment_days: u32 = bounded_or_repair(
        stored.min_employment_days,
        "minEmploymentDays",
        &MIN_EMPLOYMENT_DAYS_RANGE,
        defaults.min_employment_days,
        &mut repairs,
    );

    let fiscal_year_start_month: u32 = bounded_or_repair(
        stored.fiscal_year_start_month,
        "fiscalYearStartMonth",
        &FISCAL_YEAR_START_MONTH_RANGE,
        defaults.fiscal_year_start_month,
        &mut repairs,
    );

    let timezone: Tz = match stored.timezone.as_deref() {
        Some(name) => parse_timezone(name).unwrap_or_else(|_| {
            repairs.push(format!(
                "timezone '{name}' is not a known zone; reset to {DEFAULT_TIMEZONE}"
            ));
            defaults.timezone
        }),
        None => {
            repairs.push(format!("timezone was missing; set to {DEFAULT_TIMEZONE}"));
            defaults.timezone
        }
    };

    let business_hours: BusinessHours = parse_business_hours(
        stored.business_hours_open.as_deref(),
        stored.business_hours_close.as_deref(),
    )
    .unwrap_or_else(|| {
        repairs.push(format!(
            "business hours were missing or invalid; reset to {}-{}",
            defaults.business_hours.open().format(SETTINGS_TIME_FORMAT),
            defaults.business_hours.close().format(SETTINGS_TIME_FORMAT)
        ));
        defaults.business_hours
    });

    SettingsRepair {
        settings: SchedulingSettings {
            auto_schedule,
            frequency_days,
            cycle_start,
            transition_mode,
            custom_start_date,
            min_employment_days,
            fiscal_year_start_month,
            timezone,
            business_hours,
        },
        repairs,
    }
}

fn parse_or_repair<T: FromStr + Copy>(
    raw: Option<&str>,
    field: &str,
    default: T,
    label: fn(&T) -> &'static str,
    repairs: &mut Vec<String>,
) -> T {
    match raw {
        Some(value) => value.parse::<T>().unwrap_or_else(|_| {
            repairs.push(format!(
                "{field} '{value}' is not valid; reset to {}",
                label(&default)
            ));
            default
        }),
        None => {
            repairs.push(format!("{field} was missing; set to {}", label(&default)));
            default
        }
    }
}

fn bounded_or_repair(
    raw: Option<i64>,
    field: &str,
    range: &RangeInclusive<i64>,
    default: u32,
    repairs: &mut Vec<String>,
) -> u32 {
    match raw {
        Some(value) if range.contains(&value) => u32::try_from(value).unwrap_or(default),
        Some(value) => {
            repairs.push(format!(
                "{field} {value} is outside {}..={}; reset to {default}",
                range.start(),
                range.end()
            ));
            default
        }
        None => {
            repairs.push(format!("{field} was missing; set to {default}"));
            default
        }
    }
}

fn parse_business_hours(open: Option<&str>, close: Option<&str>) -> Option<BusinessHours> {
    let open: NaiveTime = NaiveTime::parse_from_str(open?, SETTINGS_TIME_FORMAT).ok()?;
    let close: NaiveTime = NaiveTime::parse_from_str(close?, SETTINGS_TIME_FORMAT).ok()?;
    BusinessHours::new(open, close).ok()
}
