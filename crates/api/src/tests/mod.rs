// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod settings_tests;

use cadence::{EmailMessage, MailError, Mailer, RetryPolicy, Scheduler};
use cadence_domain::EmployeeRole;
use cadence_persistence::{NewEmployee, Persistence};
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

pub fn scheduler() -> Scheduler {
    Scheduler::new(RetryPolicy::immediate())
}

/// A store with a director and a manager but no settings row.
pub struct TestStore {
    pub persistence: Persistence,
    pub store_id: i64,
    pub manager_id: i64,
}

impl TestStore {
    /// A store without an evaluation template.
    pub fn without_template() -> Self {
        let mut persistence = Persistence::new_in_memory().unwrap();
        let store_id = persistence.create_store("Uptown").unwrap();
        persistence
            .create_employee(&staff(store_id, "Dana Director", EmployeeRole::Director, None))
            .unwrap();
        let manager_id = persistence
            .create_employee(&staff(store_id, "Morgan Manager", EmployeeRole::Manager, None))
            .unwrap();
        Self {
            persistence,
            store_id,
            manager_id,
        }
    }

    /// A store ready to be scheduled.
    pub fn new() -> Self {
        let mut store = Self::without_template();
        store
            .persistence
            .create_template(store.store_id, "Quarterly Review", true, days_ago(500))
            .unwrap();
        store
    }

    /// Adds a team member hired 120 days ago, evaluated by the manager.
    pub fn hire(&mut self, name: &str) -> i64 {
        let mut employee = staff(
            self.store_id,
            name,
            EmployeeRole::TeamMember,
            Some(self.manager_id),
        );
        employee.start_date = days_ago(120);
        self.persistence.create_employee(&employee).unwrap()
    }
}

fn staff(
    store_id: i64,
    name: &str,
    role: EmployeeRole,
    evaluator_id: Option<i64>,
) -> NewEmployee {
    NewEmployee {
        store_id,
        name: String::from(name),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        role,
        start_date: days_ago(2000),
        evaluator_id,
    }
}

#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
