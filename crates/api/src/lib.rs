// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the Cadence evaluation scheduler.
//!
//! Requests are validated here before they reach the scheduler, and core or
//! persistence failures are translated into `ApiError` so that transport
//! layers never see internal error types.

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

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
    translate_repository_error,
};
pub use handlers::{
    calculate_next_evaluation, get_settings_validation, schedule_all, schedule_store,
    update_settings,
};
pub use request_response::{
    SchedulingResultsInfo, SettingsInfo, SettingsValidationResponse, UpdateSettingsRequest,
    UpdateSettingsResponse,
};
