// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `stores` - Stores and their templates
//! - `employees` - Employees, leave, change logs and scheduling projections
//! - `evaluations` - Evaluation creation and status changes
//! - `notifications` - In-app notifications
//! - `settings` - Scheduling settings upsert
//!
//! Inserted IDs come from `last_insert_rowid()` via the `backend` module.

pub mod employees;
pub mod evaluations;
pub mod notifications;
pub mod settings;
pub mod stores;
