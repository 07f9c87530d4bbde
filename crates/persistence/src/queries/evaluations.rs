// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evaluation queries.

use cadence_domain::{Evaluation, EvaluationStatus};
use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{EvaluationRow, format_timestamp};
use crate::diesel_schema::evaluations;
use crate::error::PersistenceError;

fn open_statuses() -> Vec<&'static str> {
    EvaluationStatus::OPEN
        .iter()
        .map(EvaluationStatus::as_str)
        .collect()
}

fn decode(rows: Vec<EvaluationRow>) -> Result<Vec<Evaluation>, PersistenceError> {
    rows.into_iter().map(Evaluation::try_from).collect()
}

/// Retrieves an evaluation by ID.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if absent.
pub fn get_evaluation(
    conn: &mut SqliteConnection,
    evaluation_id: i64,
) -> Result<Option<Evaluation>, PersistenceError> {
    evaluations::table
        .filter(evaluations::evaluation_id.eq(evaluation_id))
        .select(EvaluationRow::as_select())
        .first(conn)
        .optional()?
        .map(Evaluation::try_from)
        .transpose()
}

/// Lists every evaluation of an employee, oldest scheduled first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<Evaluation>, PersistenceError> {
    let rows: Vec<EvaluationRow> = evaluations::table
        .filter(evaluations::employee_id.eq(employee_id))
        .order((
            evaluations::scheduled_date.asc(),
            evaluations::evaluation_id.asc(),
        ))
        .select(EvaluationRow::as_select())
        .load(conn)?;
    decode(rows)
}

/// Lists an evaluator's evaluations in a store scheduled within
/// `[start, end]`, in any status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_evaluator_between(
    conn: &mut SqliteConnection,
    evaluator_id: i64,
    store_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Evaluation>, PersistenceError> {
    let rows: Vec<EvaluationRow> = evaluations::table
        .filter(evaluations::evaluator_id.eq(evaluator_id))
        .filter(evaluations::store_id.eq(store_id))
        .filter(evaluations::scheduled_date.ge(format_timestamp(start)))
        .filter(evaluations::scheduled_date.le(format_timestamp(end)))
        .order(evaluations::scheduled_date.asc())
        .select(EvaluationRow::as_select())
        .load(conn)?;

    debug!(
        evaluator_id,
        store_id,
        count = rows.len(),
        "Loaded evaluator calendar"
    );
    decode(rows)
}

/// Lists open evaluations scheduled at or before `before`, across stores.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_open_due_before(
    conn: &mut SqliteConnection,
    before: DateTime<Utc>,
) -> Result<Vec<Evaluation>, PersistenceError> {
    let rows: Vec<EvaluationRow> = evaluations::table
        .filter(evaluations::status.eq_any(open_statuses()))
        .filter(evaluations::scheduled_date.le(format_timestamp(before)))
        .order((
            evaluations::scheduled_date.asc(),
            evaluations::evaluation_id.asc(),
        ))
        .select(EvaluationRow::as_select())
        .load(conn)?;
    decode(rows)
}

/// Lists every evaluation in a store, most recently scheduled first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_store(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Vec<Evaluation>, PersistenceError> {
    let rows: Vec<EvaluationRow> = evaluations::table
        .filter(evaluations::store_id.eq(store_id))
        .order((
            evaluations::scheduled_date.desc(),
            evaluations::evaluation_id.desc(),
        ))
        .select(EvaluationRow::as_select())
        .load(conn)?;
    decode(rows)
}
