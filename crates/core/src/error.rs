// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::repository::{RepositoryError, RepositoryErrorKind};
use cadence_domain::{DomainError, ErrorCategory};
use thiserror::Error;

/// Where an error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub store_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub operation: String,
}

impl ErrorContext {
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            store_id: None,
            employee_id: None,
            operation: operation.into(),
        }
    }

    #[must_use]
    pub const fn with_store(mut self, store_id: i64) -> Self {
        self.store_id = Some(store_id);
        self
    }

    #[must_use]
    pub const fn with_employee(mut self, employee_id: i64) -> Self {
        self.employee_id = Some(employee_id);
        self
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.operation)?;
        if let Some(store_id) = self.store_id {
            write!(f, " (store {store_id})")?;
        }
        if let Some(employee_id) = self.employee_id {
            write!(f, " (employee {employee_id})")?;
        }
        Ok(())
    }
}

/// Errors raised by scheduling operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The store has no active evaluation template.
    #[error("No active evaluation template found for store {store_id}")]
    NoActiveTemplate { store_id: i64 },

    /// The store has no director to own scheduled evaluations.
    #[error("No director found for store {store_id}")]
    NoDirector { store_id: i64 },

    /// Another scheduling run for the store is in flight.
    #[error("A scheduling run is already in progress for store {store_id}")]
    RunInProgress { store_id: i64 },

    /// A scheduling rule or date computation failed.
    #[error("{context}: {source}")]
    Domain {
        context: ErrorContext,
        #[source]
        source: DomainError,
    },

    /// The repository failed.
    #[error("{context}: {source}")]
    Repository {
        context: ErrorContext,
        #[source]
        source: RepositoryError,
    },
}

impl CoreError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NoActiveTemplate { .. } | Self::NoDirector { .. } => ErrorCategory::Validation,
            Self::RunInProgress { .. } => ErrorCategory::Scheduling,
            Self::Domain { source, .. } => source.category(),
            Self::Repository { .. } => ErrorCategory::Database,
        }
    }

    /// Returns whether the error means the requested record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Repository { source, .. } => {
                matches!(source.kind(), RepositoryErrorKind::NotFound)
            }
            _ => false,
        }
    }

    pub(crate) fn repository(context: ErrorContext) -> impl FnOnce(RepositoryError) -> Self {
        move |source| Self::Repository { context, source }
    }

    pub(crate) fn domain(context: ErrorContext) -> impl FnOnce(DomainError) -> Self {
        move |source| Self::Domain { context, source }
    }
}

impl From<DomainError> for CoreError {
    fn from(source: DomainError) -> Self {
        Self::Domain {
            context: ErrorContext::new("evaluating scheduling rules"),
            source,
        }
    }
}
