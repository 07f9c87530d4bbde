// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store and template mutations.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::{stores, templates};
use crate::error::PersistenceError;

/// Creates a store and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_store(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(stores::table)
        .values(stores::name.eq(name))
        .execute(conn)?;
    let store_id: i64 = get_last_insert_rowid(conn)?;
    info!(store_id, name, "Created store");
    Ok(store_id)
}

/// Creates an evaluation template and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails or the store does not exist.
pub fn create_template(
    conn: &mut SqliteConnection,
    store_id: i64,
    name: &str,
    is_active: bool,
    created_at: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(templates::table)
        .values((
            templates::store_id.eq(store_id),
            templates::name.eq(name),
            templates::is_active.eq(i32::from(is_active)),
            templates::created_at.eq(format_timestamp(created_at)),
        ))
        .execute(conn)?;
    let template_id: i64 = get_last_insert_rowid(conn)?;
    info!(store_id, template_id, name, is_active, "Created template");
    Ok(template_id)
}

/// Activates or deactivates a template.
///
/// # Errors
///
/// Returns `NotFound` if the template does not exist.
pub fn set_template_active(
    conn: &mut SqliteConnection,
    template_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(templates::table)
        .filter(templates::template_id.eq(template_id))
        .set(templates::is_active.eq(i32::from(is_active)))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "template {template_id}"
        )));
    }
    Ok(())
}
