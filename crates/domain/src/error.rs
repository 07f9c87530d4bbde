// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Broad failure category used to tag errors for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A business rule could not be satisfied.
    Scheduling,
    /// Configuration or input data was malformed.
    Validation,
    /// The persistence layer failed.
    Database,
    /// Date, time, or timezone arithmetic failed.
    System,
}

impl ErrorCategory {
    /// Returns the lowercase label used in structured log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduling => "scheduling",
            Self::Validation => "validation",
            Self::Database => "database",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while evaluating scheduling rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The timezone name is not a known IANA zone.
    InvalidTimezone(String),
    /// A local/UTC conversion could not be resolved.
    TimezoneConversion {
        /// Description of the conversion that failed.
        operation: String,
    },
    /// Date arithmetic overflowed or produced an invalid date.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Business hours are malformed (open must precede close).
    InvalidBusinessHours {
        /// The configured opening time.
        open: String,
        /// The configured closing time.
        close: String,
    },
    /// The transition mode is not one of the supported modes.
    InvalidTransitionMode(String),
    /// The cycle start policy is not one of the supported policies.
    InvalidCycleStart(String),
    /// The evaluation status is not recognized.
    InvalidEvaluationStatus(String),
    /// The employee status is not recognized.
    InvalidEmployeeStatus(String),
    /// The employee role is not recognized.
    InvalidEmployeeRole(String),
    /// The scheduling type is not recognized.
    InvalidSchedulingType(String),
    /// The anchor source is not recognized.
    InvalidAnchorSource(String),
    /// The notification kind is not recognized.
    InvalidNotificationKind(String),
    /// A timestamp could not be parsed.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl DomainError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TimezoneConversion { .. } | Self::DateArithmeticOverflow { .. } => {
                ErrorCategory::System
            }
            Self::InvalidTransitionMode(_) => ErrorCategory::Scheduling,
            Self::InvalidTimezone(_)
            | Self::InvalidBusinessHours { .. }
            | Self::InvalidCycleStart(_)
            | Self::InvalidEvaluationStatus(_)
            | Self::InvalidEmployeeStatus(_)
            | Self::InvalidEmployeeRole(_)
            | Self::InvalidSchedulingType(_)
            | Self::InvalidAnchorSource(_)
            | Self::InvalidNotificationKind(_)
            | Self::DateParseError { .. } => ErrorCategory::Validation,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: '{tz}'"),
            Self::TimezoneConversion { operation } => {
                write!(f, "Timezone conversion failed while {operation}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidBusinessHours { open, close } => {
                write!(
                    f,
                    "Invalid business hours: opening time {open} must be before closing time {close}"
                )
            }
            Self::InvalidTransitionMode(mode) => write!(
                f,
                "Invalid transition mode: '{mode}'. Must be one of immediate, complete_cycle, align_next"
            ),
            Self::InvalidCycleStart(value) => write!(
                f,
                "Invalid cycle start: '{value}'. Must be one of hire_date, calendar_year, fiscal_year, custom"
            ),
            Self::InvalidEvaluationStatus(value) => {
                write!(f, "Invalid evaluation status: '{value}'")
            }
            Self::InvalidEmployeeStatus(value) => write!(f, "Invalid employee status: '{value}'"),
            Self::InvalidEmployeeRole(value) => write!(f, "Invalid employee role: '{value}'"),
            Self::InvalidSchedulingType(value) => write!(f, "Invalid scheduling type: '{value}'"),
            Self::InvalidAnchorSource(value) => write!(f, "Invalid base date source: '{value}'"),
            Self::InvalidNotificationKind(value) => {
                write!(f, "Invalid notification kind: '{value}'")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
