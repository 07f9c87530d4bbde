// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::{CoreError, ErrorContext};
use crate::repository::SchedulingRepository;
use crate::retry::{RetryPolicy, with_retry};
use cadence_domain::{
    DistributionBounds, EvaluationStatus, SchedulingSettings, distribute_workload,
    workload_window,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Levels an evaluator's calendar around `scheduled_date`.
///
/// Loads the evaluator's non-missed evaluations in the surrounding window and
/// returns the nearest date with spare capacity inside `bounds`.
///
/// # Errors
///
/// Returns an error if the evaluator's calendar cannot be loaded or a
/// candidate date cannot be resolved in the store's timezone.
pub fn distribute_evaluator_workload<R>(
    repo: &mut R,
    retry: &RetryPolicy,
    evaluator_id: i64,
    scheduled_date: DateTime<Utc>,
    store_id: i64,
    settings: &SchedulingSettings,
    bounds: &DistributionBounds,
) -> Result<DateTime<Utc>, CoreError>
where
    R: SchedulingRepository + ?Sized,
{
    let context = || ErrorContext::new("distributing evaluator workload").with_store(store_id);

    let (start, end) =
        workload_window(scheduled_date, settings.timezone).map_err(CoreError::domain(context()))?;
    let booked: Vec<DateTime<Utc>> = with_retry(retry, "load evaluator calendar", || {
        repo.evaluations_for_evaluator_between(evaluator_id, store_id, start, end)
    })
    .map_err(CoreError::repository(context()))?
    .into_iter()
    .filter(|evaluation| evaluation.status != EvaluationStatus::Missed)
    .map(|evaluation| evaluation.scheduled_date)
    .collect();

    let distributed: DateTime<Utc> = distribute_workload(
        scheduled_date,
        &booked,
        bounds,
        settings.timezone,
        &settings.business_hours,
    )
    .map_err(CoreError::domain(context()))?;

    if distributed != scheduled_date {
        debug!(
            store_id,
            evaluator_id,
            proposed = %scheduled_date,
            distributed = %distributed,
            "Moved evaluation to level evaluator workload"
        );
    }
    Ok(distributed)
}
