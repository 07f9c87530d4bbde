// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notifications and reminder emails.
//!
//! Everything here is best effort: failures are logged and counted but
//! never abort a scheduling run.

use crate::error::{CoreError, ErrorContext};
use crate::mailer::{EmailMessage, Mailer};
use crate::report::ReminderSummary;
use crate::repository::{NewNotification, SchedulingRepository};
use crate::retry::{RetryPolicy, with_retry};
use cadence_domain::{Employee, Evaluation, NotificationKind};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

/// Evaluations scheduled this far ahead receive reminders.
pub const REMINDER_LOOKAHEAD_DAYS: i64 = 7;
/// Minimum spacing between two reminders for the same evaluation.
pub const REMINDER_INTERVAL_HOURS: i64 = 24;

const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Notifies the employee and the store's managers about a new evaluation.
pub fn notify_evaluation_created<R>(
    repo: &mut R,
    mailer: &dyn Mailer,
    retry: &RetryPolicy,
    employee: &Employee,
    evaluation: &Evaluation,
    now: DateTime<Utc>,
) where
    R: SchedulingRepository + ?Sized,
{
    let when: String = evaluation
        .scheduled_date
        .format(DATE_DISPLAY_FORMAT)
        .to_string();

    let assigned = NewNotification {
        recipient_id: employee.employee_id,
        evaluation_id: Some(evaluation.evaluation_id),
        kind: NotificationKind::EvaluationAssigned,
        message: format!("A new evaluation has been scheduled for you on {when}"),
        created_at: now,
    };
    if let Err(err) = with_retry(retry, "create notification", || {
        repo.create_notification(&assigned)
    }) {
        warn!(
            employee_id = employee.employee_id,
            evaluation_id = evaluation.evaluation_id,
            error = %err,
            "Failed to record assignment notification"
        );
    }

    if let Some(address) = &employee.email {
        let message = EmailMessage {
            to: address.clone(),
            subject: String::from("New evaluation scheduled"),
            body: format!(
                "Hello {},\n\nYour next evaluation has been scheduled for {when}.",
                employee.name
            ),
        };
        if let Err(err) = with_retry(retry, "send email", || mailer.send(&message)) {
            warn!(
                employee_id = employee.employee_id,
                error = %err,
                "Failed to email evaluation assignment"
            );
        }
    }

    let managers = match with_retry(retry, "load managers", || {
        repo.store_managers(evaluation.store_id)
    }) {
        Ok(managers) => managers,
        Err(err) => {
            warn!(
                store_id = evaluation.store_id,
                error = %err,
                "Failed to load managers for evaluation notification"
            );
            return;
        }
    };

    for manager in managers
        .iter()
        .filter(|manager| manager.employee_id != employee.employee_id)
    {
        let created = NewNotification {
            recipient_id: manager.employee_id,
            evaluation_id: Some(evaluation.evaluation_id),
            kind: NotificationKind::EvaluationCreated,
            message: format!("An evaluation for {} was scheduled on {when}", employee.name),
            created_at: now,
        };
        if let Err(err) = with_retry(retry, "create notification", || {
            repo.create_notification(&created)
        }) {
            warn!(
                recipient_id = manager.employee_id,
                evaluation_id = evaluation.evaluation_id,
                error = %err,
                "Failed to record manager notification"
            );
        }
    }
}

/// Reminds employees about open evaluations coming due within a week.
///
/// Each evaluation is reminded at most once per `REMINDER_INTERVAL_HOURS`.
///
/// # Errors
///
/// Returns an error only if the due evaluations cannot be loaded.
pub fn send_evaluation_reminders<R>(
    repo: &mut R,
    mailer: &dyn Mailer,
    retry: &RetryPolicy,
    now: DateTime<Utc>,
) -> Result<ReminderSummary, CoreError>
where
    R: SchedulingRepository + ?Sized,
{
    let horizon: DateTime<Utc> = now + Duration::days(REMINDER_LOOKAHEAD_DAYS);
    let due: Vec<Evaluation> = with_retry(retry, "load due evaluations", || {
        repo.open_evaluations_due_before(horizon)
    })
    .map_err(CoreError::repository(ErrorContext::new(
        "loading evaluations due for reminders",
    )))?
    .into_iter()
    .filter(|evaluation| evaluation.scheduled_date >= now)
    .collect();

    let mut summary = ReminderSummary {
        due: due.len(),
        ..ReminderSummary::default()
    };

    for evaluation in &due {
        match remind(repo, mailer, retry, evaluation, now) {
            Ok(Reminder::Suppressed) => summary.suppressed += 1,
            Ok(Reminder::Sent { emailed }) => {
                summary.reminded += 1;
                if emailed {
                    summary.emailed += 1;
                }
            }
            Err(err) => {
                summary.failed += 1;
                warn!(
                    evaluation_id = evaluation.evaluation_id,
                    employee_id = evaluation.employee_id,
                    error = %err,
                    "Failed to send evaluation reminder"
                );
            }
        }
    }

    info!(
        due = summary.due,
        reminded = summary.reminded,
        emailed = summary.emailed,
        suppressed = summary.suppressed,
        failed = summary.failed,
        "Reminder pass complete"
    );
    Ok(summary)
}

enum Reminder {
    Suppressed,
    Sent { emailed: bool },
}

fn remind<R>(
    repo: &mut R,
    mailer: &dyn Mailer,
    retry: &RetryPolicy,
    evaluation: &Evaluation,
    now: DateTime<Utc>,
) -> Result<Reminder, CoreError>
where
    R: SchedulingRepository + ?Sized,
{
    let context = || {
        ErrorContext::new("sending reminder")
            .with_store(evaluation.store_id)
            .with_employee(evaluation.employee_id)
    };

    let last_sent = with_retry(retry, "load latest reminder", || {
        repo.latest_notification(evaluation.evaluation_id, NotificationKind::EvaluationReminder)
    })
    .map_err(CoreError::repository(context()))?;
    if last_sent.is_some_and(|sent| now - sent < Duration::hours(REMINDER_INTERVAL_HOURS)) {
        debug!(
            evaluation_id = evaluation.evaluation_id,
            "Reminder already sent within the last day"
        );
        return Ok(Reminder::Suppressed);
    }

    let employee: Employee = with_retry(retry, "load employee", || {
        repo.employee(evaluation.employee_id)
    })
    .map_err(CoreError::repository(context()))?;

    let when: String = evaluation
        .scheduled_date
        .format(DATE_DISPLAY_FORMAT)
        .to_string();
    let notification = NewNotification {
        recipient_id: employee.employee_id,
        evaluation_id: Some(evaluation.evaluation_id),
        kind: NotificationKind::EvaluationReminder,
        message: format!("Reminder: your evaluation is scheduled for {when}"),
        created_at: now,
    };
    with_retry(retry, "create notification", || {
        repo.create_notification(&notification)
    })
    .map_err(CoreError::repository(context()))?;

    let mut emailed: bool = false;
    if let Some(address) = &employee.email {
        let message = EmailMessage {
            to: address.clone(),
            subject: String::from("Upcoming evaluation reminder"),
            body: format!(
                "Hello {},\n\nThis is a reminder that your evaluation is scheduled for {when}.",
                employee.name
            ),
        };
        match with_retry(retry, "send email", || mailer.send(&message)) {
            Ok(()) => emailed = true,
            Err(err) => warn!(
                employee_id = employee.employee_id,
                error = %err,
                "Failed to email evaluation reminder"
            ),
        }
    }

    Ok(Reminder::Sent { emailed })
}
