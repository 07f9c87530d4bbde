// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduling settings queries.

use cadence_domain::StoredSchedulingSettings;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::SettingsRow;
use crate::diesel_schema::{scheduling_settings, stores};
use crate::error::PersistenceError;

/// Loads a store's settings exactly as stored.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if the store has
/// never been configured.
pub fn get_settings(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Option<StoredSchedulingSettings>, PersistenceError> {
    let row: Option<SettingsRow> = scheduling_settings::table
        .filter(scheduling_settings::store_id.eq(store_id))
        .select(SettingsRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(StoredSchedulingSettings::from))
}

/// IDs of stores whose settings enable auto-scheduling, ascending.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_auto_schedule_stores(
    conn: &mut SqliteConnection,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(scheduling_settings::table
        .filter(scheduling_settings::auto_schedule.eq(1))
        .order(scheduling_settings::store_id.asc())
        .select(scheduling_settings::store_id)
        .load(conn)?)
}

/// Returns whether a store exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn store_exists(conn: &mut SqliteConnection, store_id: i64) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(
        stores::table.filter(stores::store_id.eq(store_id)),
    ))
    .get_result(conn)?)
}
