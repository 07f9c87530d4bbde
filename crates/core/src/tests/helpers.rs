// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    EmailMessage, MailError, Mailer, NewEvaluation, NewNotification, RepositoryError,
    RetryPolicy, Scheduler, SchedulingRepository,
};
use cadence_domain::{
    Employee, EmployeeRole, EmployeeStatus, EmployeeSummary, Evaluation, EvaluationStatus,
    EvaluatorRef, LeaveStatus, NotificationKind, SchedulingMetadata, SchedulingPreferences,
    SchedulingSettings, SchedulingType, StoredSchedulingSettings, Template, parse_timezone,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const STORE_ID: i64 = 1;
pub const DIRECTOR_ID: i64 = 1;
pub const MANAGER_ID: i64 = 2;

/// Wednesday 2026-05-13, 11:00 in New York.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 13, 15, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn days_ahead(days: i64) -> DateTime<Utc> {
    now() + Duration::days(days)
}

pub fn scheduler() -> Scheduler {
    Scheduler::new(RetryPolicy::immediate())
}

/// A repository backed by plain collections.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    pub employees: Vec<Employee>,
    pub evaluations: Vec<Evaluation>,
    pub settings: HashMap<i64, StoredSchedulingSettings>,
    pub templates: Vec<Template>,
    pub notifications: Vec<NewNotification>,
    /// Employees whose evaluation history fails to load.
    pub failing_employees: HashSet<i64>,
    /// Remaining transient failures for `active_employees`.
    pub transient_failures: u32,
    /// Reject every evaluation insert as a duplicate.
    pub reject_creates: bool,
    next_evaluation_id: i64,
}

impl InMemoryRepository {
    pub fn evaluations_of(&self, employee_id: i64) -> Vec<&Evaluation> {
        self.evaluations
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .collect()
    }

    pub fn notifications_of(&self, kind: NotificationKind) -> Vec<&NewNotification> {
        self.notifications.iter().filter(|n| n.kind == kind).collect()
    }

    pub fn add_evaluation(
        &mut self,
        employee_id: i64,
        status: EvaluationStatus,
        scheduled_date: DateTime<Utc>,
        completed_date: Option<DateTime<Utc>>,
    ) -> i64 {
        self.next_evaluation_id += 1;
        let evaluation_id: i64 = self.next_evaluation_id;
        self.evaluations.push(Evaluation {
            evaluation_id,
            employee_id,
            evaluator_id: MANAGER_ID,
            store_id: STORE_ID,
            template_id: 1,
            status,
            scheduled_date,
            completed_date,
            scheduling: None,
        });
        evaluation_id
    }

    fn summary(employee: &Employee) -> EmployeeSummary {
        employee.summary()
    }
}

impl SchedulingRepository for InMemoryRepository {
    fn auto_schedule_stores(&mut self) -> Result<Vec<i64>, RepositoryError> {
        let mut stores: Vec<i64> = self
            .settings
            .iter()
            .filter(|(_, s)| s.auto_schedule == Some(true))
            .map(|(id, _)| *id)
            .collect();
        stores.sort_unstable();
        Ok(stores)
    }

    fn active_employees(&mut self, store_id: i64) -> Result<Vec<Employee>, RepositoryError> {
        if self.transient_failures > 0 {
            self.transient_failures -= 1;
            return Err(RepositoryError::unavailable("database is locked"));
        }
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.store_id == store_id && e.status == EmployeeStatus::Active)
            .cloned()
            .collect();
        employees.sort_by_key(|e| e.employee_id);
        Ok(employees)
    }

    fn employee(&mut self, employee_id: i64) -> Result<Employee, RepositoryError> {
        self.employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("employee {employee_id}")))
    }

    fn evaluations_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        if self.failing_employees.contains(&employee_id) {
            return Err(RepositoryError::query("corrupt evaluation history"));
        }
        Ok(self.evaluations_of(employee_id).into_iter().cloned().collect())
    }

    fn evaluations_for_evaluator_between(
        &mut self,
        evaluator_id: i64,
        store_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self
            .evaluations
            .iter()
            .filter(|e| {
                e.evaluator_id == evaluator_id
                    && e.store_id == store_id
                    && e.scheduled_date >= start
                    && e.scheduled_date <= end
            })
            .cloned()
            .collect())
    }

    fn open_evaluations_due_before(
        &mut self,
        before: DateTime<Utc>,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self
            .evaluations
            .iter()
            .filter(|e| e.status.is_open() && e.scheduled_date <= before)
            .cloned()
            .collect())
    }

    fn settings(
        &mut self,
        store_id: i64,
    ) -> Result<Option<StoredSchedulingSettings>, RepositoryError> {
        Ok(self.settings.get(&store_id).cloned())
    }

    fn save_settings(
        &mut self,
        store_id: i64,
        settings: &StoredSchedulingSettings,
    ) -> Result<(), RepositoryError> {
        self.settings.insert(store_id, settings.clone());
        Ok(())
    }

    fn active_template(&mut self, store_id: i64) -> Result<Option<Template>, RepositoryError> {
        Ok(self
            .templates
            .iter()
            .filter(|t| t.store_id == store_id && t.is_active)
            .max_by_key(|t| (t.created_at, t.template_id))
            .cloned())
    }

    fn director(&mut self, store_id: i64) -> Result<Option<EmployeeSummary>, RepositoryError> {
        Ok(self
            .employees
            .iter()
            .find(|e| {
                e.store_id == store_id
                    && e.role == EmployeeRole::Director
                    && e.status == EmployeeStatus::Active
            })
            .map(Self::summary))
    }

    fn store_managers(&mut self, store_id: i64) -> Result<Vec<EmployeeSummary>, RepositoryError> {
        Ok(self
            .employees
            .iter()
            .filter(|e| {
                e.store_id == store_id && e.role.is_manager() && e.status == EmployeeStatus::Active
            })
            .map(Self::summary)
            .collect())
    }

    fn create_evaluation(
        &mut self,
        evaluation: &NewEvaluation,
    ) -> Result<Evaluation, RepositoryError> {
        let has_open: bool = self
            .evaluations
            .iter()
            .any(|e| e.employee_id == evaluation.employee_id && e.status.is_open());
        if self.reject_creates || has_open {
            return Err(RepositoryError::conflict(format!(
                "employee {} already has an open evaluation",
                evaluation.employee_id
            )));
        }
        self.next_evaluation_id += 1;
        let created = Evaluation {
            evaluation_id: self.next_evaluation_id,
            employee_id: evaluation.employee_id,
            evaluator_id: evaluation.evaluator_id,
            store_id: evaluation.store_id,
            template_id: evaluation.template_id,
            status: EvaluationStatus::PendingSelfEvaluation,
            scheduled_date: evaluation.scheduled_date,
            completed_date: None,
            scheduling: Some(SchedulingMetadata {
                scheduling_type: SchedulingType::Auto,
                base_date: evaluation.base_date,
                base_date_source: evaluation.base_date_source,
            }),
        };
        self.evaluations.push(created.clone());
        Ok(created)
    }

    fn update_evaluation_status(
        &mut self,
        evaluation_id: i64,
        status: EvaluationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let evaluation = self
            .evaluations
            .iter_mut()
            .find(|e| e.evaluation_id == evaluation_id)
            .ok_or_else(|| RepositoryError::not_found(format!("evaluation {evaluation_id}")))?;
        evaluation.status = status;
        evaluation.completed_date = (status == EvaluationStatus::Completed).then_some(at);
        Ok(())
    }

    fn update_scheduling_preferences(
        &mut self,
        employee_id: i64,
        preferences: &SchedulingPreferences,
    ) -> Result<(), RepositoryError> {
        let employee = self
            .employees
            .iter_mut()
            .find(|e| e.employee_id == employee_id)
            .ok_or_else(|| RepositoryError::not_found(format!("employee {employee_id}")))?;
        employee.scheduling_preferences = preferences.clone();
        Ok(())
    }

    fn create_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<(), RepositoryError> {
        self.notifications.push(notification.clone());
        Ok(())
    }

    fn latest_notification(
        &mut self,
        evaluation_id: i64,
        kind: NotificationKind,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.evaluation_id == Some(evaluation_id) && n.kind == kind)
            .map(|n| n.created_at)
            .max())
    }
}

/// A mailer that keeps every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Rejected(String::from("mailbox full")));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn staff(employee_id: i64, name: &str, role: EmployeeRole) -> Employee {
    Employee {
        employee_id,
        store_id: STORE_ID,
        name: String::from(name),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        role,
        status: EmployeeStatus::Active,
        start_date: days_ago(2000),
        evaluator: None,
        leave: LeaveStatus::default(),
        role_history: Vec::new(),
        store_history: Vec::new(),
        scheduling_preferences: SchedulingPreferences::default(),
    }
}

pub fn team_member(employee_id: i64, name: &str, hired_days_ago: i64) -> Employee {
    Employee {
        start_date: days_ago(hired_days_ago),
        evaluator: Some(EvaluatorRef {
            employee_id: MANAGER_ID,
            name: String::from("Morgan Manager"),
            leave: LeaveStatus::default(),
        }),
        ..staff(employee_id, name, EmployeeRole::TeamMember)
    }
}

pub fn store_settings() -> SchedulingSettings {
    SchedulingSettings {
        auto_schedule: true,
        timezone: parse_timezone("America/New_York").unwrap(),
        ..SchedulingSettings::default()
    }
}

/// A store with a director, a manager who evaluates everyone, an active
/// template and auto-scheduling enabled.
pub fn seeded_store() -> InMemoryRepository {
    let mut repo = InMemoryRepository::default();
    repo.employees
        .push(staff(DIRECTOR_ID, "Dana Director", EmployeeRole::Director));
    repo.employees
        .push(staff(MANAGER_ID, "Morgan Manager", EmployeeRole::Manager));
    repo.templates.push(Template {
        template_id: 1,
        store_id: STORE_ID,
        name: String::from("Quarterly Review"),
        is_active: true,
        created_at: days_ago(500),
    });
    repo.settings.insert(STORE_ID, store_settings().to_stored());
    repo
}
