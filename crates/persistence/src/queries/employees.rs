// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee queries.
//!
//! Employees are returned fully resolved: the evaluator reference carries the
//! evaluator's name and leave, and both change logs are attached.

use cadence_domain::{
    Employee, EmployeeRole, EmployeeStatus, EmployeeSummary, EvaluatorRef, HistoryEntry,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{CHANGE_TYPE_ROLE, CHANGE_TYPE_STORE, EmployeeRow, HistoryRow};
use crate::diesel_schema::{employee_history, employees};
use crate::error::PersistenceError;

/// Retrieves an employee by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
/// Returns `Ok(None)` if the employee does not exist.
pub fn get_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Option<Employee>, PersistenceError> {
    debug!(employee_id, "Looking up employee");

    let row: Option<EmployeeRow> = employees::table
        .filter(employees::employee_id.eq(employee_id))
        .select(EmployeeRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| resolve_employee(conn, row)).transpose()
}

/// Lists the active employees of a store, ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn list_active_employees(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Vec<Employee>, PersistenceError> {
    let rows: Vec<EmployeeRow> = employees::table
        .filter(employees::store_id.eq(store_id))
        .filter(employees::status.eq(EmployeeStatus::Active.as_str()))
        .order(employees::employee_id.asc())
        .select(EmployeeRow::as_select())
        .load(conn)?;

    debug!(store_id, count = rows.len(), "Loaded active employees");

    rows.into_iter()
        .map(|row| resolve_employee(conn, row))
        .collect()
}

/// Finds the store's active director, lowest ID first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_director(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Option<EmployeeSummary>, PersistenceError> {
    let row: Option<EmployeeRow> = employees::table
        .filter(employees::store_id.eq(store_id))
        .filter(employees::status.eq(EmployeeStatus::Active.as_str()))
        .filter(employees::role.eq(EmployeeRole::Director.as_str()))
        .order(employees::employee_id.asc())
        .select(EmployeeRow::as_select())
        .first(conn)
        .optional()?;

    row.as_ref().map(EmployeeRow::summary).transpose()
}

/// Lists the store's active managers and directors.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_store_managers(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Vec<EmployeeSummary>, PersistenceError> {
    let rows: Vec<EmployeeRow> = employees::table
        .filter(employees::store_id.eq(store_id))
        .filter(employees::status.eq(EmployeeStatus::Active.as_str()))
        .filter(employees::role.eq_any([
            EmployeeRole::Manager.as_str(),
            EmployeeRole::Director.as_str(),
        ]))
        .order(employees::employee_id.asc())
        .select(EmployeeRow::as_select())
        .load(conn)?;

    rows.iter().map(EmployeeRow::summary).collect()
}

fn resolve_employee(
    conn: &mut SqliteConnection,
    row: EmployeeRow,
) -> Result<Employee, PersistenceError> {
    let evaluator: Option<EvaluatorRef> = match row.evaluator_id {
        Some(evaluator_id) => employees::table
            .filter(employees::employee_id.eq(evaluator_id))
            .select(EmployeeRow::as_select())
            .first(conn)
            .optional()?
            .map(|evaluator| {
                Ok::<_, PersistenceError>(EvaluatorRef {
                    employee_id: evaluator.employee_id,
                    leave: evaluator.leave()?,
                    name: evaluator.name,
                })
            })
            .transpose()?,
        None => None,
    };

    let history: Vec<HistoryRow> = employee_history::table
        .filter(employee_history::employee_id.eq(row.employee_id))
        .order(employee_history::changed_at.asc())
        .select(HistoryRow::as_select())
        .load(conn)?;

    let mut role_history: Vec<HistoryEntry> = Vec::new();
    let mut store_history: Vec<HistoryEntry> = Vec::new();
    for entry in history {
        if entry.change_type == CHANGE_TYPE_ROLE {
            role_history.push(entry.try_into()?);
        } else if entry.change_type == CHANGE_TYPE_STORE {
            store_history.push(entry.try_into()?);
        } else {
            return Err(PersistenceError::InvalidData(format!(
                "unknown change type '{}' for employee {}",
                entry.change_type, row.employee_id
            )));
        }
    }

    Ok(Employee {
        employee_id: row.employee_id,
        store_id: row.store_id,
        role: row.role()?,
        status: row.status()?,
        start_date: row.start_date()?,
        leave: row.leave()?,
        scheduling_preferences: row.scheduling_preferences()?,
        evaluator,
        role_history,
        store_history,
        name: row.name,
        email: row.email,
    })
}
