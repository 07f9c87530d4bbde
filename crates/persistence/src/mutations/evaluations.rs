// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evaluation mutations.
//!
//! The partial unique index on open evaluations rejects a second open
//! evaluation for the same employee with `UniqueViolation`.

use cadence::NewEvaluation;
use cadence_domain::{Evaluation, EvaluationStatus, SchedulingType};
use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{RecordedEvaluation, format_timestamp};
use crate::diesel_schema::evaluations;
use crate::error::PersistenceError;
use crate::queries::evaluations::get_evaluation;

fn reload(conn: &mut SqliteConnection, evaluation_id: i64) -> Result<Evaluation, PersistenceError> {
    get_evaluation(conn, evaluation_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("evaluation {evaluation_id}")))
}

/// Inserts an automatically scheduled evaluation in its initial status.
///
/// # Errors
///
/// Returns `UniqueViolation` if the employee already has an open
/// evaluation, or another error if the insert fails.
pub fn create_scheduled_evaluation(
    conn: &mut SqliteConnection,
    evaluation: &NewEvaluation,
) -> Result<Evaluation, PersistenceError> {
    diesel::insert_into(evaluations::table)
        .values((
            evaluations::employee_id.eq(evaluation.employee_id),
            evaluations::evaluator_id.eq(evaluation.evaluator_id),
            evaluations::store_id.eq(evaluation.store_id),
            evaluations::template_id.eq(evaluation.template_id),
            evaluations::status.eq(EvaluationStatus::PendingSelfEvaluation.as_str()),
            evaluations::scheduled_date.eq(format_timestamp(evaluation.scheduled_date)),
            evaluations::scheduling_type.eq(SchedulingType::Auto.as_str()),
            evaluations::base_date.eq(format_timestamp(evaluation.base_date)),
            evaluations::base_date_source.eq(evaluation.base_date_source.as_str()),
        ))
        .execute(conn)?;

    let evaluation_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        evaluation_id,
        employee_id = evaluation.employee_id,
        store_id = evaluation.store_id,
        "Inserted scheduled evaluation"
    );
    reload(conn, evaluation_id)
}

/// Inserts a manually recorded evaluation, such as one completed before
/// automatic scheduling was enabled.
///
/// # Errors
///
/// Returns `UniqueViolation` if the record is open and the employee already
/// has an open evaluation, or another error if the insert fails.
pub fn record_manual_evaluation(
    conn: &mut SqliteConnection,
    evaluation: &RecordedEvaluation,
) -> Result<Evaluation, PersistenceError> {
    diesel::insert_into(evaluations::table)
        .values((
            evaluations::employee_id.eq(evaluation.employee_id),
            evaluations::evaluator_id.eq(evaluation.evaluator_id),
            evaluations::store_id.eq(evaluation.store_id),
            evaluations::template_id.eq(evaluation.template_id),
            evaluations::status.eq(evaluation.status.as_str()),
            evaluations::scheduled_date.eq(format_timestamp(evaluation.scheduled_date)),
            evaluations::completed_date.eq(evaluation.completed_date.map(format_timestamp)),
            evaluations::scheduling_type.eq(SchedulingType::Manual.as_str()),
        ))
        .execute(conn)?;

    let evaluation_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        evaluation_id,
        employee_id = evaluation.employee_id,
        status = evaluation.status.as_str(),
        "Recorded evaluation"
    );
    reload(conn, evaluation_id)
}

/// Moves an evaluation to a new status.
///
/// Moving to `completed` stamps `completed_at` as the completion date.
///
/// # Errors
///
/// Returns `NotFound` if the evaluation does not exist, or
/// `UniqueViolation` if reopening it would create a second open evaluation.
pub fn update_status(
    conn: &mut SqliteConnection,
    evaluation_id: i64,
    status: EvaluationStatus,
    completed_at: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let completed_date: Option<String> =
        (status == EvaluationStatus::Completed).then(|| format_timestamp(completed_at));

    let updated: usize = diesel::update(evaluations::table)
        .filter(evaluations::evaluation_id.eq(evaluation_id))
        .set((
            evaluations::status.eq(status.as_str()),
            evaluations::completed_date.eq(completed_date),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "evaluation {evaluation_id}"
        )));
    }
    info!(evaluation_id, status = status.as_str(), "Updated evaluation status");
    Ok(())
}
