// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Template queries.

use cadence_domain::Template;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::TemplateRow;
use crate::diesel_schema::templates;
use crate::error::PersistenceError;

/// Returns the store's active template; the most recently created wins.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_active_template(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Option<Template>, PersistenceError> {
    templates::table
        .filter(templates::store_id.eq(store_id))
        .filter(templates::is_active.eq(1))
        .order((templates::created_at.desc(), templates::template_id.desc()))
        .select(TemplateRow::as_select())
        .first(conn)
        .optional()?
        .map(Template::try_from)
        .transpose()
}
