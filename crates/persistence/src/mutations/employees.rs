// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee mutations.

use cadence_domain::{EmployeeStatus, LeaveStatus, SchedulingPreferences};
use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewEmployee, format_timestamp};
use crate::diesel_schema::{employee_history, employees};
use crate::error::PersistenceError;

fn ensure_updated(updated: usize, employee_id: i64) -> Result<(), PersistenceError> {
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "employee {employee_id}"
        )));
    }
    Ok(())
}

/// Inserts an active employee and returns the new ID.
///
/// # Errors
///
/// Returns an error if the insert fails or a referenced store or evaluator
/// does not exist.
pub fn create_employee(
    conn: &mut SqliteConnection,
    employee: &NewEmployee,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(employees::table)
        .values((
            employees::store_id.eq(employee.store_id),
            employees::name.eq(&employee.name),
            employees::email.eq(employee.email.as_deref()),
            employees::role.eq(employee.role.as_str()),
            employees::status.eq(EmployeeStatus::Active.as_str()),
            employees::start_date.eq(format_timestamp(employee.start_date)),
            employees::evaluator_id.eq(employee.evaluator_id),
        ))
        .execute(conn)?;

    let employee_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        employee_id,
        store_id = employee.store_id,
        role = employee.role.as_str(),
        "Created employee"
    );
    Ok(employee_id)
}

/// Sets an employee's employment status.
///
/// # Errors
///
/// Returns `NotFound` if the employee does not exist.
pub fn set_status(
    conn: &mut SqliteConnection,
    employee_id: i64,
    status: EmployeeStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(employees::table)
        .filter(employees::employee_id.eq(employee_id))
        .set(employees::status.eq(status.as_str()))
        .execute(conn)?;
    ensure_updated(updated, employee_id)
}

/// Reassigns (or clears) an employee's evaluator.
///
/// # Errors
///
/// Returns `NotFound` if the employee does not exist.
pub fn set_evaluator(
    conn: &mut SqliteConnection,
    employee_id: i64,
    evaluator_id: Option<i64>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(employees::table)
        .filter(employees::employee_id.eq(employee_id))
        .set(employees::evaluator_id.eq(evaluator_id))
        .execute(conn)?;
    ensure_updated(updated, employee_id)
}

/// Replaces an employee's leave state.
///
/// # Errors
///
/// Returns `NotFound` if the employee does not exist.
pub fn set_leave(
    conn: &mut SqliteConnection,
    employee_id: i64,
    leave: &LeaveStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(employees::table)
        .filter(employees::employee_id.eq(employee_id))
        .set((
            employees::is_on_leave.eq(i32::from(leave.is_on_leave)),
            employees::leave_start_date.eq(leave.start_date.map(format_timestamp)),
            employees::leave_end_date.eq(leave.end_date.map(format_timestamp)),
        ))
        .execute(conn)?;
    debug!(employee_id, is_on_leave = leave.is_on_leave, "Updated leave");
    ensure_updated(updated, employee_id)
}

/// Appends an entry to an employee's role or store change log.
///
/// # Errors
///
/// Returns an error if the insert fails or the employee does not exist.
pub fn record_history(
    conn: &mut SqliteConnection,
    employee_id: i64,
    change_type: &str,
    changed_at: DateTime<Utc>,
    previous: Option<&str>,
    current: &str,
) -> Result<(), PersistenceError> {
    diesel::insert_into(employee_history::table)
        .values((
            employee_history::employee_id.eq(employee_id),
            employee_history::change_type.eq(change_type),
            employee_history::changed_at.eq(format_timestamp(changed_at)),
            employee_history::previous_value.eq(previous),
            employee_history::new_value.eq(current),
        ))
        .execute(conn)?;
    info!(employee_id, change_type, current, "Recorded employee change");
    Ok(())
}

/// Stores the latest projected evaluation date for an employee.
///
/// # Errors
///
/// Returns `NotFound` if the employee does not exist.
pub fn update_scheduling_preferences(
    conn: &mut SqliteConnection,
    employee_id: i64,
    preferences: &SchedulingPreferences,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(employees::table)
        .filter(employees::employee_id.eq(employee_id))
        .set((
            employees::next_evaluation_date
                .eq(preferences.next_evaluation_date.map(format_timestamp)),
            employees::last_calculated_at.eq(preferences.last_calculated_at.map(format_timestamp)),
        ))
        .execute(conn)?;
    ensure_updated(updated, employee_id)
}
