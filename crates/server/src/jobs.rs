// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cron triggers for the daily scheduling run and the reminder pass.
//!
//! Expressions use the six-field format (`sec min hour day month dow`).
//! Both jobs run the blocking scheduler on a worker thread.

use cadence::{ReminderSummary, RunSummary, RunTarget};
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

use crate::AppState;

/// Cron expressions for the background jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub scheduling_cron: String,
    /// `None` disables reminders.
    pub reminder_cron: Option<String>,
}

/// Registers the jobs and starts the cron scheduler.
///
/// The returned scheduler must be kept alive for the jobs to keep firing.
///
/// # Errors
///
/// Returns an error if an expression is invalid or the scheduler cannot
/// start.
pub async fn start_jobs(
    state: &AppState,
    config: &JobConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let scheduling_state = state.clone();
    let scheduling_job = Job::new_async(config.scheduling_cron.as_str(), move |_uuid, _lock| {
        let state = scheduling_state.clone();
        Box::pin(async move {
            run_scheduling_job(state).await;
        })
    })?;
    scheduler.add(scheduling_job).await?;
    info!(cron = %config.scheduling_cron, "Registered scheduling job");

    if let Some(reminder_cron) = &config.reminder_cron {
        let reminder_state = state.clone();
        let reminder_job = Job::new_async(reminder_cron.as_str(), move |_uuid, _lock| {
            let state = reminder_state.clone();
            Box::pin(async move {
                run_reminder_job(state).await;
            })
        })?;
        scheduler.add(reminder_job).await?;
        info!(cron = %reminder_cron, "Registered reminder job");
    } else {
        info!("Evaluation reminders disabled");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Schedules every auto-scheduling store.
pub async fn run_scheduling_job(state: AppState) {
    info!("Cron scheduling run starting");
    let outcome = tokio::task::spawn_blocking(move || {
        let mut persistence = state.persistence.blocking_lock();
        state.scheduler.run_scheduling(
            &mut *persistence,
            state.mailer.as_ref(),
            RunTarget::All,
            Utc::now(),
        )
    })
    .await;

    match outcome {
        Ok(Ok(RunSummary::All(global))) => info!(
            stores_processed = global.stores_processed,
            stores_failed = global.stores_failed,
            scheduled = global.scheduled,
            errors = global.errors,
            "Cron scheduling run complete"
        ),
        Ok(Ok(RunSummary::Store(result))) => info!(
            store_id = result.store_id,
            scheduled = result.scheduled,
            "Cron scheduling run complete"
        ),
        Ok(Err(e)) => error!(
            category = e.category().as_str(),
            error = %e,
            "Cron scheduling run failed"
        ),
        Err(e) => error!(error = %e, "Cron scheduling task did not complete"),
    }
}

/// Sends reminders for upcoming open evaluations.
pub async fn run_reminder_job(state: AppState) {
    let outcome = tokio::task::spawn_blocking(move || {
        let mut persistence = state.persistence.blocking_lock();
        state.scheduler.send_evaluation_reminders(
            &mut *persistence,
            state.mailer.as_ref(),
            Utc::now(),
        )
    })
    .await;

    match outcome {
        Ok(Ok(summary)) => log_reminders(&summary),
        Ok(Err(e)) => error!(error = %e, "Reminder pass failed"),
        Err(e) => error!(error = %e, "Reminder task did not complete"),
    }
}

fn log_reminders(summary: &ReminderSummary) {
    if summary.failed > 0 {
        warn!(
            due = summary.due,
            reminded = summary.reminded,
            failed = summary.failed,
            "Reminder pass finished with failures"
        );
    } else {
        info!(
            due = summary.due,
            reminded = summary.reminded,
            emailed = summary.emailed,
            suppressed = summary.suppressed,
            "Reminder pass complete"
        );
    }
}
