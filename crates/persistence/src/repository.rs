// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SchedulingRepository` over the Diesel queries and mutations.

use cadence::{NewEvaluation, NewNotification, RepositoryError, SchedulingRepository};
use cadence_domain::{
    Employee, EmployeeSummary, Evaluation, EvaluationStatus, NotificationKind,
    SchedulingPreferences, StoredSchedulingSettings, Template,
};
use chrono::{DateTime, Utc};

use crate::Persistence;
use crate::error::PersistenceError;
use crate::{mutations, queries};

impl SchedulingRepository for Persistence {
    fn auto_schedule_stores(&mut self) -> Result<Vec<i64>, RepositoryError> {
        Ok(queries::settings::list_auto_schedule_stores(&mut self.conn)?)
    }

    fn active_employees(&mut self, store_id: i64) -> Result<Vec<Employee>, RepositoryError> {
        Ok(queries::employees::list_active_employees(
            &mut self.conn,
            store_id,
        )?)
    }

    fn employee(&mut self, employee_id: i64) -> Result<Employee, RepositoryError> {
        queries::employees::get_employee(&mut self.conn, employee_id)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("employee {employee_id}")).into()
        })
    }

    fn evaluations_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(queries::evaluations::list_for_employee(
            &mut self.conn,
            employee_id,
        )?)
    }

    fn evaluations_for_evaluator_between(
        &mut self,
        evaluator_id: i64,
        store_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(queries::evaluations::list_for_evaluator_between(
            &mut self.conn,
            evaluator_id,
            store_id,
            start,
            end,
        )?)
    }

    fn open_evaluations_due_before(
        &mut self,
        before: DateTime<Utc>,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(queries::evaluations::list_open_due_before(
            &mut self.conn,
            before,
        )?)
    }

    fn settings(
        &mut self,
        store_id: i64,
    ) -> Result<Option<StoredSchedulingSettings>, RepositoryError> {
        Ok(queries::settings::get_settings(&mut self.conn, store_id)?)
    }

    fn save_settings(
        &mut self,
        store_id: i64,
        settings: &StoredSchedulingSettings,
    ) -> Result<(), RepositoryError> {
        Ok(mutations::settings::save_settings(
            &mut self.conn,
            store_id,
            settings,
        )?)
    }

    fn active_template(&mut self, store_id: i64) -> Result<Option<Template>, RepositoryError> {
        Ok(queries::templates::get_active_template(
            &mut self.conn,
            store_id,
        )?)
    }

    fn director(&mut self, store_id: i64) -> Result<Option<EmployeeSummary>, RepositoryError> {
        Ok(queries::employees::find_director(&mut self.conn, store_id)?)
    }

    fn store_managers(&mut self, store_id: i64) -> Result<Vec<EmployeeSummary>, RepositoryError> {
        Ok(queries::employees::list_store_managers(
            &mut self.conn,
            store_id,
        )?)
    }

    fn create_evaluation(
        &mut self,
        evaluation: &NewEvaluation,
    ) -> Result<Evaluation, RepositoryError> {
        Ok(mutations::evaluations::create_scheduled_evaluation(
            &mut self.conn,
            evaluation,
        )?)
    }

    fn update_evaluation_status(
        &mut self,
        evaluation_id: i64,
        status: EvaluationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Ok(mutations::evaluations::update_status(
            &mut self.conn,
            evaluation_id,
            status,
            at,
        )?)
    }

    fn update_scheduling_preferences(
        &mut self,
        employee_id: i64,
        preferences: &SchedulingPreferences,
    ) -> Result<(), RepositoryError> {
        Ok(mutations::employees::update_scheduling_preferences(
            &mut self.conn,
            employee_id,
            preferences,
        )?)
    }

    fn create_notification(
        &mut self,
        notification: &NewNotification,
    ) -> Result<(), RepositoryError> {
        Ok(mutations::notifications::create_notification(
            &mut self.conn,
            notification,
        )?)
    }

    fn latest_notification(
        &mut self,
        evaluation_id: i64,
        kind: NotificationKind,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        Ok(queries::notifications::latest_for_evaluation(
            &mut self.conn,
            evaluation_id,
            kind,
        )?)
    }
}
