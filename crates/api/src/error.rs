// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use cadence::{CoreError, RepositoryError, RepositoryErrorKind};
use cadence_domain::DomainError;
use cadence_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A scheduling precondition was not met.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with work already in progress.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The database is temporarily unavailable.
    Unavailable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Unavailable { message } => write!(f, "Service unavailable: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// Parse failures name the settings field they belong to.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: Option<&str> = match &err {
        DomainError::InvalidTimezone(_) => Some("timezone"),
        DomainError::InvalidBusinessHours { .. } => Some("business_hours"),
        DomainError::InvalidTransitionMode(_) => Some("transition_mode"),
        DomainError::InvalidCycleStart(_) => Some("cycle_start"),
        _ => None,
    };
    match field {
        Some(field) => ApiError::InvalidInput {
            field: field.to_string(),
            message: err.to_string(),
        },
        None => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::NoActiveTemplate { .. } => ApiError::DomainRuleViolation {
            rule: String::from("active_template"),
            message: err.to_string(),
        },
        CoreError::NoDirector { .. } => ApiError::DomainRuleViolation {
            rule: String::from("store_director"),
            message: err.to_string(),
        },
        CoreError::RunInProgress { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        CoreError::Domain { .. } => ApiError::Internal {
            message: err.to_string(),
        },
        CoreError::Repository { ref source, .. } => {
            let message: String = err.to_string();
            match source.kind() {
                RepositoryErrorKind::NotFound => ApiError::ResourceNotFound {
                    resource_type: String::from("Record"),
                    message,
                },
                RepositoryErrorKind::Unavailable => ApiError::Unavailable { message },
                RepositoryErrorKind::Conflict => ApiError::Conflict { message },
                RepositoryErrorKind::Query => ApiError::Internal { message },
            }
        }
    }
}

/// Translates a repository error raised outside a scheduling run.
#[must_use]
pub fn translate_repository_error(err: &RepositoryError) -> ApiError {
    let message: String = err.to_string();
    match err.kind() {
        RepositoryErrorKind::NotFound => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        RepositoryErrorKind::Unavailable => ApiError::Unavailable { message },
        RepositoryErrorKind::Conflict => ApiError::Conflict { message },
        RepositoryErrorKind::Query => ApiError::Internal { message },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    translate_repository_error(&RepositoryError::from(err))
}
