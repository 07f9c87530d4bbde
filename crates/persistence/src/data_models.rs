// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion into domain values.
//!
//! Timestamps are stored as RFC 3339 UTC text at second precision so that
//! lexical order matches chronological order.

use std::str::FromStr;

use cadence_domain::{
    AnchorSource, EmployeeRole, EmployeeStatus, EmployeeSummary, Evaluation, EvaluationStatus,
    HistoryEntry, LeaveStatus, NotificationKind, SchedulingMetadata, SchedulingPreferences,
    SchedulingType, StoredSchedulingSettings, Template,
};
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::diesel_schema::{
    employee_history, employees, evaluations, notifications, scheduling_settings, templates,
};
use crate::error::PersistenceError;

/// `employee_history.change_type` for role changes.
pub const CHANGE_TYPE_ROLE: &str = "role_change";
/// `employee_history.change_type` for store transfers.
pub const CHANGE_TYPE_STORE: &str = "store_transfer";

/// Formats a timestamp for storage.
#[must_use]
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns `InvalidData` if the text is not RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| PersistenceError::InvalidData(format!("timestamp '{value}': {e}")))
}

fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    value.map(parse_timestamp).transpose()
}

/// Diesel Queryable struct for employee rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = employees)]
pub struct EmployeeRow {
    pub employee_id: i64,
    pub store_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub status: String,
    pub start_date: String,
    pub evaluator_id: Option<i64>,
    pub is_on_leave: i32,
    pub leave_start_date: Option<String>,
    pub leave_end_date: Option<String>,
    pub next_evaluation_date: Option<String>,
    pub last_calculated_at: Option<String>,
}

impl EmployeeRow {
    pub fn role(&self) -> Result<EmployeeRole, PersistenceError> {
        Ok(EmployeeRole::from_str(&self.role)?)
    }

    pub fn status(&self) -> Result<EmployeeStatus, PersistenceError> {
        Ok(EmployeeStatus::from_str(&self.status)?)
    }

    pub fn start_date(&self) -> Result<DateTime<Utc>, PersistenceError> {
        parse_timestamp(&self.start_date)
    }

    pub fn leave(&self) -> Result<LeaveStatus, PersistenceError> {
        Ok(LeaveStatus {
            is_on_leave: self.is_on_leave != 0,
            start_date: parse_optional_timestamp(self.leave_start_date.as_deref())?,
            end_date: parse_optional_timestamp(self.leave_end_date.as_deref())?,
        })
    }

    pub fn scheduling_preferences(&self) -> Result<SchedulingPreferences, PersistenceError> {
        Ok(SchedulingPreferences {
            next_evaluation_date: parse_optional_timestamp(self.next_evaluation_date.as_deref())?,
            last_calculated_at: parse_optional_timestamp(self.last_calculated_at.as_deref())?,
        })
    }

    pub fn summary(&self) -> Result<EmployeeSummary, PersistenceError> {
        Ok(EmployeeSummary {
            employee_id: self.employee_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role()?,
        })
    }
}

/// Diesel Queryable struct for role and store change log rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = employee_history)]
pub struct HistoryRow {
    pub change_type: String,
    pub changed_at: String,
    pub previous_value: Option<String>,
    pub new_value: String,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = PersistenceError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            changed_at: parse_timestamp(&row.changed_at)?,
            previous: row.previous_value,
            current: row.new_value,
        })
    }
}

/// Diesel Queryable struct for evaluation rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = evaluations)]
pub struct EvaluationRow {
    pub evaluation_id: i64,
    pub employee_id: i64,
    pub evaluator_id: i64,
    pub store_id: i64,
    pub template_id: i64,
    pub status: String,
    pub scheduled_date: String,
    pub completed_date: Option<String>,
    pub scheduling_type: Option<String>,
    pub base_date: Option<String>,
    pub base_date_source: Option<String>,
}

impl TryFrom<EvaluationRow> for Evaluation {
    type Error = PersistenceError;

    fn try_from(row: EvaluationRow) -> Result<Self, Self::Error> {
        // Metadata is only meaningful when all three columns were written.
        let scheduling: Option<SchedulingMetadata> =
            match (&row.scheduling_type, &row.base_date, &row.base_date_source) {
                (Some(scheduling_type), Some(base_date), Some(source)) => {
                    Some(SchedulingMetadata {
                        scheduling_type: SchedulingType::from_str(scheduling_type)?,
                        base_date: parse_timestamp(base_date)?,
                        base_date_source: AnchorSource::from_str(source)?,
                    })
                }
                _ => None,
            };

        Ok(Self {
            evaluation_id: row.evaluation_id,
            employee_id: row.employee_id,
            evaluator_id: row.evaluator_id,
            store_id: row.store_id,
            template_id: row.template_id,
            status: EvaluationStatus::from_str(&row.status)?,
            scheduled_date: parse_timestamp(&row.scheduled_date)?,
            completed_date: parse_optional_timestamp(row.completed_date.as_deref())?,
            scheduling,
        })
    }
}

/// Diesel Queryable struct for scheduling settings rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scheduling_settings)]
pub struct SettingsRow {
    pub auto_schedule: Option<i32>,
    pub frequency: Option<i64>,
    pub cycle_start: Option<String>,
    pub transition_mode: Option<String>,
    pub custom_start_date: Option<String>,
    pub min_employment_days: Option<i64>,
    pub fiscal_year_start_month: Option<i64>,
    pub timezone: Option<String>,
    pub business_hours_open: Option<String>,
    pub business_hours_close: Option<String>,
}

impl From<SettingsRow> for StoredSchedulingSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            auto_schedule: row.auto_schedule.map(|flag| flag != 0),
            frequency: row.frequency,
            cycle_start: row.cycle_start,
            transition_mode: row.transition_mode,
            custom_start_date: row.custom_start_date,
            min_employment_days: row.min_employment_days,
            fiscal_year_start_month: row.fiscal_year_start_month,
            timezone: row.timezone,
            business_hours_open: row.business_hours_open,
            business_hours_close: row.business_hours_close,
        }
    }
}

/// Diesel Queryable struct for template rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = templates)]
pub struct TemplateRow {
    pub template_id: i64,
    pub store_id: i64,
    pub name: String,
    pub is_active: i32,
    pub created_at: String,
}

impl TryFrom<TemplateRow> for Template {
    type Error = PersistenceError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            template_id: row.template_id,
            store_id: row.store_id,
            name: row.name,
            is_active: row.is_active != 0,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Diesel Queryable struct for notification rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
pub struct NotificationRow {
    pub notification_id: i64,
    pub recipient_id: i64,
    pub evaluation_id: Option<i64>,
    pub kind: String,
    pub message: String,
    pub created_at: String,
}

/// A stored in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationData {
    pub notification_id: i64,
    pub recipient_id: i64,
    pub evaluation_id: Option<i64>,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for NotificationData {
    type Error = PersistenceError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            notification_id: row.notification_id,
            recipient_id: row.recipient_id,
            evaluation_id: row.evaluation_id,
            kind: NotificationKind::from_str(&row.kind)?,
            message: row.message,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// An employee to be inserted.
///
/// New employees start active, off leave and with no projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub store_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: EmployeeRole,
    pub start_date: DateTime<Utc>,
    pub evaluator_id: Option<i64>,
}

/// A manually recorded evaluation to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvaluation {
    pub employee_id: i64,
    pub evaluator_id: i64,
    pub store_id: i64,
    pub template_id: i64,
    pub status: EvaluationStatus,
    pub scheduled_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
}
