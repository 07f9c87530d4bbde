// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification queries.

use cadence_domain::NotificationKind;
use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{NotificationData, NotificationRow, parse_timestamp};
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Returns when the most recent notification of `kind` for an evaluation
/// was created.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn latest_for_evaluation(
    conn: &mut SqliteConnection,
    evaluation_id: i64,
    kind: NotificationKind,
) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    let created_at: Option<String> = notifications::table
        .filter(notifications::evaluation_id.eq(evaluation_id))
        .filter(notifications::kind.eq(kind.as_str()))
        .order(notifications::created_at.desc())
        .select(notifications::created_at)
        .first(conn)
        .optional()?;

    created_at.as_deref().map(parse_timestamp).transpose()
}

/// Lists a recipient's notifications, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_for_recipient(
    conn: &mut SqliteConnection,
    recipient_id: i64,
) -> Result<Vec<NotificationData>, PersistenceError> {
    let rows: Vec<NotificationRow> = notifications::table
        .filter(notifications::recipient_id.eq(recipient_id))
        .order((
            notifications::created_at.desc(),
            notifications::notification_id.desc(),
        ))
        .select(NotificationRow::as_select())
        .load(conn)?;

    rows.into_iter().map(NotificationData::try_from).collect()
}
