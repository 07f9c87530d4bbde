// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Connection setup that cannot be expressed in Diesel DSL.
//!
//! Everything here is connection-level: opening, PRAGMA configuration,
//! migrations and `last_insert_rowid()`. Domain queries and mutations live
//! in `queries/` and `mutations/`.

pub mod sqlite;
