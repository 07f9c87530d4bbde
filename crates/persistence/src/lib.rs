// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the Cadence evaluation scheduler.
//!
//! `Persistence` owns a single Diesel connection and implements
//! `cadence::SchedulingRepository`, so the orchestrator runs against it
//! directly. It also exposes the store, employee and template writes the
//! HTTP layer and tests need to set up data.
//!
//! ## Idempotency
//!
//! A partial unique index allows at most one open evaluation per employee.
//! A second insert fails with `PersistenceError::UniqueViolation`, which the
//! repository seam reports as `RepositoryErrorKind::Conflict`.
//!
//! ## Timestamps
//!
//! Stored as RFC 3339 UTC text at second precision. Range filters compare
//! the text directly.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never observe each other's rows.

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
#![allow(clippy::multiple_crate_versions)]

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod repository;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use cadence_domain::{Employee, EmployeeRole, EmployeeStatus, Evaluation, LeaveStatus};
use chrono::{DateTime, Utc};
use diesel::SqliteConnection;

pub use backend::sqlite::MIGRATIONS;
pub use data_models::{NewEmployee, NotificationData, RecordedEvaluation};
pub use error::PersistenceError;

use data_models::{CHANGE_TYPE_ROLE, CHANGE_TYPE_STORE};

/// Global counter for unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:cadence_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Stores & Templates
    // ========================================================================

    /// Creates a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_store(&mut self, name: &str) -> Result<i64, PersistenceError> {
        mutations::stores::create_store(&mut self.conn, name)
    }

    /// Returns whether a store exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn store_exists(&mut self, store_id: i64) -> Result<bool, PersistenceError> {
        queries::settings::store_exists(&mut self.conn, store_id)
    }

    /// Creates an evaluation template for a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the store does not exist.
    pub fn create_template(
        &mut self,
        store_id: i64,
        name: &str,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::stores::create_template(&mut self.conn, store_id, name, is_active, created_at)
    }

    /// Activates or deactivates a template.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the template does not exist.
    pub fn set_template_active(
        &mut self,
        template_id: i64,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::stores::set_template_active(&mut self.conn, template_id, is_active)
    }

    // ========================================================================
    // Employees
    // ========================================================================

    /// Creates an active employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_employee(&mut self, employee: &NewEmployee) -> Result<i64, PersistenceError> {
        mutations::employees::create_employee(&mut self.conn, employee)
    }

    /// Loads a fully resolved employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails. Returns `Ok(None)` if absent.
    pub fn get_employee(&mut self, employee_id: i64) -> Result<Option<Employee>, PersistenceError> {
        queries::employees::get_employee(&mut self.conn, employee_id)
    }

    /// Sets an employee's employment status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the employee does not exist.
    pub fn set_employee_status(
        &mut self,
        employee_id: i64,
        status: EmployeeStatus,
    ) -> Result<(), PersistenceError> {
        mutations::employees::set_status(&mut self.conn, employee_id, status)
    }

    /// Reassigns or clears an employee's evaluator.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the employee does not exist.
    pub fn set_evaluator(
        &mut self,
        employee_id: i64,
        evaluator_id: Option<i64>,
    ) -> Result<(), PersistenceError> {
        mutations::employees::set_evaluator(&mut self.conn, employee_id, evaluator_id)
    }

    /// Replaces an employee's leave state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the employee does not exist.
    pub fn set_leave(
        &mut self,
        employee_id: i64,
        leave: &LeaveStatus,
    ) -> Result<(), PersistenceError> {
        mutations::employees::set_leave(&mut self.conn, employee_id, leave)
    }

    /// Logs a role change for an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record_role_change(
        &mut self,
        employee_id: i64,
        changed_at: DateTime<Utc>,
        previous: Option<EmployeeRole>,
        current: EmployeeRole,
    ) -> Result<(), PersistenceError> {
        mutations::employees::record_history(
            &mut self.conn,
            employee_id,
            CHANGE_TYPE_ROLE,
            changed_at,
            previous.as_ref().map(EmployeeRole::as_str),
            current.as_str(),
        )
    }

    /// Logs a store transfer for an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record_store_transfer(
        &mut self,
        employee_id: i64,
        changed_at: DateTime<Utc>,
        previous_store_id: Option<i64>,
        current_store_id: i64,
    ) -> Result<(), PersistenceError> {
        let previous: Option<String> = previous_store_id.map(|id| id.to_string());
        mutations::employees::record_history(
            &mut self.conn,
            employee_id,
            CHANGE_TYPE_STORE,
            changed_at,
            previous.as_deref(),
            &current_store_id.to_string(),
        )
    }

    // ========================================================================
    // Evaluations & Notifications
    // ========================================================================

    /// Records an evaluation created outside the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if it would be a second open evaluation.
    pub fn record_evaluation(
        &mut self,
        evaluation: &RecordedEvaluation,
    ) -> Result<Evaluation, PersistenceError> {
        mutations::evaluations::record_manual_evaluation(&mut self.conn, evaluation)
    }

    /// Lists a store's evaluations, most recently scheduled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn store_evaluations(
        &mut self,
        store_id: i64,
    ) -> Result<Vec<Evaluation>, PersistenceError> {
        queries::evaluations::list_for_store(&mut self.conn, store_id)
    }

    /// Lists a recipient's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn notifications_for(
        &mut self,
        recipient_id: i64,
    ) -> Result<Vec<NotificationData>, PersistenceError> {
        queries::notifications::list_for_recipient(&mut self.conn, recipient_id)
    }
}
