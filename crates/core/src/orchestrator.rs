// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch scheduling runs.
//!
//! A store run proceeds in two passes:
//!
//! 1. Every active employee is assessed. Employees without an evaluator, with
//!    an upcoming open evaluation, or failing an eligibility check are
//!    skipped; the rest receive an anchor and a priority score.
//! 2. Candidates are processed highest priority first so that evaluators
//!    with limited capacity see the most urgent employees before anyone else.
//!
//! Failures for one employee are recorded in the result and never abort the
//! batch. Only unmet store preconditions (no template, no director) or a
//! concurrent run fail the whole store.

use crate::error::{CoreError, ErrorContext};
use crate::locks::StoreLocks;
use crate::mailer::Mailer;
use crate::notify::{notify_evaluation_created, send_evaluation_reminders};
use crate::report::{
    EmployeeProjection, ErrorDetail, GlobalSchedulingResult, ReminderSummary, RunSummary,
    RunTarget, ScheduledDetail, SkippedDetail, StoreOutcome, StoreSchedulingResult,
};
use crate::repository::{NewEvaluation, RepositoryErrorKind, SchedulingRepository};
use crate::retry::{RetryPolicy, with_retry};
use crate::settings_validator::{validate_and_repair_settings, validate_auto_scheduling};
use crate::workload::distribute_evaluator_workload;
use cadence_domain::{
    DistributionBounds, Employee, Evaluation, EvaluationStatus, FIRST_EVALUATION_MAX_LEAD_DAYS,
    FIRST_EVALUATION_MIN_LEAD_DAYS, LastEvaluation, MAX_DAYS_BETWEEN, MIN_DAYS_BETWEEN,
    SchedulingPreferences, SchedulingSettings, Template, adjust_to_business_hours,
    calculate_next_evaluation_date, calculate_priority_score, get_last_evaluation_date,
    handle_transition_mode, is_employee_eligible, rank_by_priority, repair_settings,
    validate_evaluation_timing,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

/// Runs evaluation scheduling against a repository.
///
/// The scheduler holds no timer; callers pass `now` explicitly.
#[derive(Debug, Default)]
pub struct Scheduler {
    locks: StoreLocks,
    retry: RetryPolicy,
}

/// An employee that passed assessment.
struct Candidate {
    employee: Employee,
    last: LastEvaluation,
    evaluations: Vec<Evaluation>,
}

enum Assessment {
    Skip(String),
    Candidate {
        last: LastEvaluation,
        evaluations: Vec<Evaluation>,
        priority_score: u32,
    },
}

enum CandidateOutcome {
    Scheduled(ScheduledDetail),
    Skipped(SkippedDetail),
}

impl Scheduler {
    #[must_use]
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            locks: StoreLocks::new(),
            retry,
        }
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub const fn locks(&self) -> &StoreLocks {
        &self.locks
    }

    /// Dispatches a run for one store or for every auto-scheduling store.
    ///
    /// # Errors
    ///
    /// Returns an error if a single-store run fails, or if the list of
    /// auto-scheduling stores cannot be loaded.
    pub fn run_scheduling<R>(
        &self,
        repo: &mut R,
        mailer: &dyn Mailer,
        target: RunTarget,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        match target {
            RunTarget::Store(store_id) => self
                .schedule_store_evaluations(repo, mailer, store_id, now)
                .map(RunSummary::Store),
            RunTarget::All => self
                .schedule_all_evaluations(repo, mailer, now)
                .map(RunSummary::All),
        }
    }

    /// Schedules every store with auto-scheduling enabled.
    ///
    /// Stores run sequentially; a failing store is recorded and the run moves
    /// on to the next one.
    ///
    /// # Errors
    ///
    /// Returns an error only if the list of stores cannot be loaded.
    pub fn schedule_all_evaluations<R>(
        &self,
        repo: &mut R,
        mailer: &dyn Mailer,
        now: DateTime<Utc>,
    ) -> Result<GlobalSchedulingResult, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        let stores: Vec<i64> = with_retry(&self.retry, "load auto-scheduling stores", || {
            repo.auto_schedule_stores()
        })
        .map_err(CoreError::repository(ErrorContext::new(
            "loading auto-scheduling stores",
        )))?;

        info!(stores = stores.len(), "Starting global scheduling run");
        let mut global = GlobalSchedulingResult::default();
        for store_id in stores {
            let outcome: StoreOutcome =
                match self.schedule_store_evaluations(repo, mailer, store_id, now) {
                    Ok(result) => StoreOutcome::Completed(result),
                    Err(err) => {
                        error!(
                            store_id,
                            category = err.category().as_str(),
                            error = %err,
                            "Store scheduling run failed"
                        );
                        StoreOutcome::Failed {
                            store_id,
                            error: err.to_string(),
                        }
                    }
                };
            global.absorb(outcome);
        }

        info!(
            stores_processed = global.stores_processed,
            stores_failed = global.stores_failed,
            scheduled = global.scheduled,
            skipped = global.skipped,
            errors = global.errors,
            "Global scheduling run complete"
        );
        Ok(global)
    }

    /// Schedules the next evaluation for every eligible employee of a store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RunInProgress` when another run holds the store,
    /// `CoreError::NoActiveTemplate` / `CoreError::NoDirector` for unmet
    /// preconditions, or a repository error if settings or employees cannot be
    /// loaded.
    pub fn schedule_store_evaluations<R>(
        &self,
        repo: &mut R,
        mailer: &dyn Mailer,
        store_id: i64,
        now: DateTime<Utc>,
    ) -> Result<StoreSchedulingResult, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        let _guard = self
            .locks
            .try_acquire(store_id)
            .ok_or(CoreError::RunInProgress { store_id })?;
        info!(store_id, "Starting store scheduling run");

        let validation = validate_and_repair_settings(repo, &self.retry, store_id)?;
        let readiness = validate_auto_scheduling(repo, &self.retry, store_id)?;
        for issue in &readiness.configuration_issues {
            warn!(store_id, issue = %issue, "Scheduling configuration issue");
        }

        let settings: SchedulingSettings = validation.settings;
        let template: Template = validation.template;

        let employees: Vec<Employee> = with_retry(&self.retry, "load employees", || {
            repo.active_employees(store_id)
        })
        .map_err(CoreError::repository(
            ErrorContext::new("loading active employees").with_store(store_id),
        ))?;

        let mut result = StoreSchedulingResult::new(store_id);
        result.total = employees.len();
        result.configuration_issues = readiness.configuration_issues;
        result.settings_repairs = validation.repairs;

        let mut candidates: Vec<(Candidate, u32)> = Vec::with_capacity(employees.len());
        for employee in employees {
            match self.assess_employee(repo, &settings, &employee, now) {
                Ok(Assessment::Skip(reason)) => {
                    debug!(
                        store_id,
                        employee_id = employee.employee_id,
                        reason = %reason,
                        "Skipping employee"
                    );
                    result.record_skipped(SkippedDetail {
                        employee_id: employee.employee_id,
                        employee_name: employee.name,
                        reason,
                        projected_date: None,
                    });
                }
                Ok(Assessment::Candidate {
                    last,
                    evaluations,
                    priority_score,
                }) => candidates.push((
                    Candidate {
                        employee,
                        last,
                        evaluations,
                    },
                    priority_score,
                )),
                Err(err) => record_failure(&mut result, &employee, &err),
            }
        }

        rank_by_priority(&mut candidates);

        for (candidate, priority_score) in &candidates {
            match self.schedule_candidate(
                repo,
                mailer,
                &settings,
                &template,
                candidate,
                *priority_score,
                now,
            ) {
                Ok(CandidateOutcome::Scheduled(detail)) => result.record_scheduled(detail),
                Ok(CandidateOutcome::Skipped(detail)) => result.record_skipped(detail),
                Err(err) => record_failure(&mut result, &candidate.employee, &err),
            }
        }

        info!(
            store_id,
            total = result.total,
            scheduled = result.scheduled,
            skipped = result.skipped,
            errors = result.errors,
            "Store scheduling run complete"
        );
        Ok(result)
    }

    /// Projects an employee's next evaluation date without creating it.
    ///
    /// The projection is written to the employee's scheduling preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist, the date cannot be
    /// computed, or the preferences cannot be saved.
    pub fn calculate_employee_schedule<R>(
        &self,
        repo: &mut R,
        employee_id: i64,
        now: DateTime<Utc>,
    ) -> Result<EmployeeProjection, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        let context = || ErrorContext::new("projecting next evaluation").with_employee(employee_id);

        let employee: Employee =
            with_retry(&self.retry, "load employee", || repo.employee(employee_id))
                .map_err(CoreError::repository(context()))?;
        let context = || context().with_store(employee.store_id);

        let stored = with_retry(&self.retry, "load settings", || {
            repo.settings(employee.store_id)
        })
        .map_err(CoreError::repository(context()))?
        .unwrap_or_default();
        let settings: SchedulingSettings = repair_settings(&stored).settings;

        let evaluations: Vec<Evaluation> = with_retry(&self.retry, "load evaluations", || {
            repo.evaluations_for_employee(employee_id)
        })
        .map_err(CoreError::repository(context()))?;

        let last: LastEvaluation = get_last_evaluation_date(&employee, &evaluations, now);
        let next = calculate_next_evaluation_date(&employee, &last, &settings, now)
            .map_err(CoreError::domain(context()))?;
        let timing = validate_evaluation_timing(next.date, &last, &settings, now)
            .map_err(CoreError::domain(context()))?;
        if let Some(anomaly) = &timing.anomaly {
            warn!(
                store_id = employee.store_id,
                employee_id,
                anomaly = %anomaly,
                "Scheduling anomaly: projected date was forced"
            );
        }

        let preferences = SchedulingPreferences {
            next_evaluation_date: Some(timing.date),
            last_calculated_at: Some(now),
        };
        with_retry(&self.retry, "save scheduling preferences", || {
            repo.update_scheduling_preferences(employee_id, &preferences)
        })
        .map_err(CoreError::repository(context()))?;

        info!(
            store_id = employee.store_id,
            employee_id,
            next_evaluation_date = %timing.date,
            base_date_source = %last.source,
            "Projected next evaluation"
        );
        Ok(EmployeeProjection {
            employee_id,
            next_evaluation_date: timing.date,
            base_date: last.date,
            base_date_source: last.source,
            anomaly: timing.anomaly,
            calculated_at: now,
        })
    }

    /// Sends reminders for open evaluations coming due.
    ///
    /// # Errors
    ///
    /// Returns an error if the due evaluations cannot be loaded.
    pub fn send_evaluation_reminders<R>(
        &self,
        repo: &mut R,
        mailer: &dyn Mailer,
        now: DateTime<Utc>,
    ) -> Result<ReminderSummary, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        send_evaluation_reminders(repo, mailer, &self.retry, now)
    }

    fn assess_employee<R>(
        &self,
        repo: &mut R,
        settings: &SchedulingSettings,
        employee: &Employee,
        now: DateTime<Utc>,
    ) -> Result<Assessment, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        if employee.evaluator.is_none() {
            return Ok(Assessment::Skip(String::from("No evaluator assigned")));
        }

        let evaluations: Vec<Evaluation> = with_retry(&self.retry, "load evaluations", || {
            repo.evaluations_for_employee(employee.employee_id)
        })
        .map_err(CoreError::repository(
            ErrorContext::new("loading evaluations")
                .with_store(employee.store_id)
                .with_employee(employee.employee_id),
        ))?;

        if let Some(upcoming) = evaluations
            .iter()
            .find(|e| e.status.is_open() && e.scheduled_date >= now)
        {
            return Ok(Assessment::Skip(format!(
                "Evaluation {} is already scheduled for {}",
                upcoming.evaluation_id,
                upcoming.scheduled_date.to_rfc3339()
            )));
        }

        let last: LastEvaluation = get_last_evaluation_date(employee, &evaluations, now);
        let decision = is_employee_eligible(employee, settings, &last, now);
        if let Some(reason) = decision.reason {
            return Ok(Assessment::Skip(reason.to_string()));
        }

        let priority_score: u32 = calculate_priority_score(employee, &last, &evaluations, now);
        debug!(
            store_id = employee.store_id,
            employee_id = employee.employee_id,
            priority_score,
            base_date_source = %last.source,
            "Employee eligible for scheduling"
        );
        Ok(Assessment::Candidate {
            last,
            evaluations,
            priority_score,
        })
    }

    #[allow(clippy::too_many_arguments, clippy::too_many_lines)]
    fn schedule_candidate<R>(
        &self,
        repo: &mut R,
        mailer: &dyn Mailer,
        settings: &SchedulingSettings,
        template: &Template,
        candidate: &Candidate,
        priority_score: u32,
        now: DateTime<Utc>,
    ) -> Result<CandidateOutcome, CoreError>
    where
        R: SchedulingRepository + ?Sized,
    {
        let employee: &Employee = &candidate.employee;
        let store_id: i64 = employee.store_id;
        let employee_id: i64 = employee.employee_id;
        let context = || {
            ErrorContext::new("scheduling evaluation")
                .with_store(store_id)
                .with_employee(employee_id)
        };
        let skipped = |reason: String, projected_date: Option<DateTime<Utc>>| {
            CandidateOutcome::Skipped(SkippedDetail {
                employee_id,
                employee_name: employee.name.clone(),
                reason,
                projected_date,
            })
        };

        let Some(evaluator) = &employee.evaluator else {
            return Ok(skipped(String::from("No evaluator assigned"), None));
        };

        let next = calculate_next_evaluation_date(employee, &candidate.last, settings, now)
            .map_err(CoreError::domain(context()))?;

        let overdue: Option<&Evaluation> = candidate
            .evaluations
            .iter()
            .filter(|e| e.status.is_open() && e.scheduled_date < now)
            .max_by_key(|e| (e.scheduled_date, e.evaluation_id));

        let mut superseded: Option<&Evaluation> = None;
        if let Some(existing) = overdue {
            let outcome = handle_transition_mode(Some(existing), settings, next.date, now);
            if outcome.forced {
                warn!(
                    store_id,
                    employee_id,
                    mode = outcome.mode.as_str(),
                    date = %outcome.date,
                    "Scheduling anomaly: transition date forced to ceiling"
                );
            }

            if outcome.supersedes.is_some() {
                superseded = Some(existing);
            } else {
                let projected: DateTime<Utc> = adjust_to_business_hours(
                    outcome.date,
                    settings.timezone,
                    &settings.business_hours,
                )
                .map_err(CoreError::domain(context()))?;
                let preferences = SchedulingPreferences {
                    next_evaluation_date: Some(projected),
                    last_calculated_at: Some(now),
                };
                with_retry(&self.retry, "save scheduling preferences", || {
                    repo.update_scheduling_preferences(employee_id, &preferences)
                })
                .map_err(CoreError::repository(context()))?;
                return Ok(skipped(
                    format!(
                        "Evaluation {} is overdue and still open; next evaluation projected under {} mode",
                        existing.evaluation_id,
                        outcome.mode.as_str()
                    ),
                    Some(projected),
                ));
            }
        }

        let timing = validate_evaluation_timing(next.date, &candidate.last, settings, now)
            .map_err(CoreError::domain(context()))?;
        if let Some(anomaly) = &timing.anomaly {
            warn!(
                store_id,
                employee_id,
                anomaly = %anomaly,
                "Scheduling anomaly: evaluation date was forced"
            );
        }

        let bounds: DistributionBounds =
            distribution_bounds(&candidate.last, next.catch_up, timing.date, now);
        let scheduled_date: DateTime<Utc> = distribute_evaluator_workload(
            repo,
            &self.retry,
            evaluator.employee_id,
            timing.date,
            store_id,
            settings,
            &bounds,
        )?;

        let new_evaluation = NewEvaluation {
            employee_id,
            evaluator_id: evaluator.employee_id,
            store_id,
            template_id: template.template_id,
            scheduled_date,
            base_date: next.base_date,
            base_date_source: next.base_date_source,
        };
        if let Some(existing) = superseded {
            let evaluation_id: i64 = existing.evaluation_id;
            with_retry(&self.retry, "mark evaluation missed", || {
                repo.update_evaluation_status(evaluation_id, EvaluationStatus::Missed, now)
            })
            .map_err(CoreError::repository(context()))?;
            info!(
                store_id,
                employee_id, evaluation_id, "Marked overdue evaluation as missed"
            );
        }
        let created: Evaluation = match with_retry(&self.retry, "create evaluation", || {
            repo.create_evaluation(&new_evaluation)
        }) {
            Ok(created) => created,
            Err(err) => {
                // The overdue evaluation stays the employee's open one.
                if let Some(existing) = superseded {
                    self.restore_superseded(repo, existing, now);
                }
                if err.kind() == RepositoryErrorKind::Conflict {
                    debug!(store_id, employee_id, "Open evaluation already exists");
                    return Ok(skipped(
                        String::from("Employee already has an open evaluation"),
                        None,
                    ));
                }
                return Err(CoreError::repository(context())(err));
            }
        };

        info!(
            store_id,
            employee_id,
            evaluation_id = created.evaluation_id,
            evaluator_id = evaluator.employee_id,
            scheduled_date = %created.scheduled_date,
            priority_score,
            "Scheduled evaluation"
        );

        notify_evaluation_created(repo, mailer, &self.retry, employee, &created, now);

        Ok(CandidateOutcome::Scheduled(ScheduledDetail {
            employee_id,
            employee_name: employee.name.clone(),
            evaluation_id: created.evaluation_id,
            evaluator_id: evaluator.employee_id,
            scheduled_date: created.scheduled_date,
            base_date: next.base_date,
            base_date_source: next.base_date_source,
            priority_score,
            anomaly: timing.anomaly,
            superseded_evaluation_id: superseded.map(|e| e.evaluation_id),
        }))
    }

    /// Puts a superseded evaluation back to its prior status after its
    /// replacement could not be created.
    fn restore_superseded<R>(&self, repo: &mut R, existing: &Evaluation, now: DateTime<Utc>)
    where
        R: SchedulingRepository + ?Sized,
    {
        let evaluation_id: i64 = existing.evaluation_id;
        match with_retry(&self.retry, "restore superseded evaluation", || {
            repo.update_evaluation_status(evaluation_id, existing.status, now)
        }) {
            Ok(()) => warn!(
                store_id = existing.store_id,
                employee_id = existing.employee_id,
                evaluation_id,
                status = existing.status.as_str(),
                "Replacement evaluation not created; restored overdue evaluation"
            ),
            Err(e) => error!(
                store_id = existing.store_id,
                employee_id = existing.employee_id,
                evaluation_id,
                error = %e,
                "Failed to restore superseded evaluation"
            ),
        }
    }
}

/// Range workload leveling may move a date within.
///
/// First evaluations stay in their two-week to ninety-day window. Lapsed
/// cycles keep the two-week lead and stay at or before the spacing ceiling
/// when it is still ahead. Later ones stay between the minimum and maximum
/// spacing from the anchor. A date that was already forced outside those
/// bounds widens them to include itself.
fn distribution_bounds(
    last: &LastEvaluation,
    catch_up: bool,
    date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DistributionBounds {
    let lead: DateTime<Utc> = now + Duration::days(FIRST_EVALUATION_MIN_LEAD_DAYS);
    let ceiling: DateTime<Utc> = last.date + Duration::days(MAX_DAYS_BETWEEN);
    let (earliest, latest) = if last.is_first_evaluation() {
        (lead, now + Duration::days(FIRST_EVALUATION_MAX_LEAD_DAYS))
    } else if catch_up || ceiling < lead {
        (lead, ceiling.max(lead))
    } else {
        (
            (last.date + Duration::days(MIN_DAYS_BETWEEN)).max(now),
            ceiling,
        )
    };
    DistributionBounds {
        earliest: earliest.min(date),
        latest: latest.max(date),
    }
}

fn record_failure(result: &mut StoreSchedulingResult, employee: &Employee, err: &CoreError) {
    error!(
        store_id = employee.store_id,
        employee_id = employee.employee_id,
        category = err.category().as_str(),
        error = %err,
        "Failed to schedule employee"
    );
    result.record_error(ErrorDetail {
        employee_id: employee.employee_id,
        employee_name: employee.name.clone(),
        error: err.to_string(),
        category: err.category().as_str().to_string(),
    });
}
