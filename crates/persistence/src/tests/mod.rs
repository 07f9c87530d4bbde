// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod employee_tests;
mod evaluation_tests;
mod initialization_tests;
mod scheduling_tests;

use crate::{NewEmployee, Persistence, RecordedEvaluation};
use cadence::{EmailMessage, MailError, Mailer};
use cadence_domain::{
    EmployeeRole, Evaluation, EvaluationStatus, SchedulingSettings, parse_timezone,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Mutex;

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

/// A store with a director, a manager and an active template.
pub struct SeededStore {
    pub persistence: Persistence,
    pub store_id: i64,
    pub director_id: i64,
    pub manager_id: i64,
    pub template_id: i64,
}

impl SeededStore {
    pub fn new() -> Self {
        let mut persistence = Persistence::new_in_memory().unwrap();
        let store_id = persistence.create_store("Downtown").unwrap();
        let director = new_employee(store_id, "Dana Director", EmployeeRole::Director, 2000, None);
        let director_id = persistence.create_employee(&director).unwrap();
        let manager = new_employee(store_id, "Morgan Manager", EmployeeRole::Manager, 2000, None);
        let manager_id = persistence.create_employee(&manager).unwrap();
        let template_id = persistence
            .create_template(store_id, "Quarterly Review", true, days_ago(500))
            .unwrap();
        Self {
            persistence,
            store_id,
            director_id,
            manager_id,
            template_id,
        }
    }

    /// Adds a team member evaluated by the store manager.
    pub fn hire(&mut self, name: &str, hired_days_ago: i64) -> i64 {
        let employee = new_employee(
            self.store_id,
            name,
            EmployeeRole::TeamMember,
            hired_days_ago,
            Some(self.manager_id),
        );
        self.persistence.create_employee(&employee).unwrap()
    }

    pub fn record(
        &mut self,
        employee_id: i64,
        status: EvaluationStatus,
        scheduled_date: DateTime<Utc>,
        completed_date: Option<DateTime<Utc>>,
    ) -> Evaluation {
        self.persistence
            .record_evaluation(&RecordedEvaluation {
                employee_id,
                evaluator_id: self.manager_id,
                store_id: self.store_id,
                template_id: self.template_id,
                status,
                scheduled_date,
                completed_date,
            })
            .unwrap()
    }
}

pub fn new_employee(
    store_id: i64,
    name: &str,
    role: EmployeeRole,
    hired_days_ago: i64,
    evaluator_id: Option<i64>,
) -> NewEmployee {
    NewEmployee {
        store_id,
        name: String::from(name),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        role,
        start_date: days_ago(hired_days_ago),
        evaluator_id,
    }
}

pub fn store_settings() -> SchedulingSettings {
    SchedulingSettings {
        auto_schedule: true,
        timezone: parse_timezone("America/New_York").unwrap(),
        ..SchedulingSettings::default()
    }
}

/// A mailer that keeps every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
