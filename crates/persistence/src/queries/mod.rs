// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `employees` - Employees with evaluator, leave and history resolved
//! - `evaluations` - Evaluation history, evaluator calendars, open evaluations
//! - `notifications` - Notification lookups
//! - `settings` - Scheduling settings and auto-scheduling stores
//! - `templates` - Active template selection

pub mod employees;
pub mod evaluations;
pub mod notifications;
pub mod settings;
pub mod templates;
