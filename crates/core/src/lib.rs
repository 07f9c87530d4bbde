// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod locks;
mod mailer;
mod notify;
mod orchestrator;
mod report;
mod repository;
mod retry;
mod settings_validator;
mod workload;

#[cfg(test)]
mod tests;

pub use error::{CoreError, ErrorContext};
pub use locks::{StoreLockGuard, StoreLocks};
pub use mailer::{EmailMessage, MailError, Mailer};
pub use notify::{REMINDER_INTERVAL_HOURS, REMINDER_LOOKAHEAD_DAYS};
pub use orchestrator::Scheduler;
pub use report::{
    EmployeeProjection, ErrorDetail, GlobalSchedulingResult, ReminderSummary, RunSummary,
    RunTarget, ScheduledDetail, SkippedDetail, StoreOutcome, StoreSchedulingResult,
};
pub use repository::{
    NewEvaluation, NewNotification, RepositoryError, RepositoryErrorKind, SchedulingRepository,
};
pub use retry::{RetryPolicy, Retryable, with_retry};
pub use settings_validator::{
    AutoSchedulingValidation, SettingsValidation, validate_and_repair_settings,
    validate_auto_scheduling,
};
pub use workload::distribute_evaluator_workload;
