// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification mutations.

use cadence::NewNotification;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::format_timestamp;
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Inserts an in-app notification.
///
/// # Errors
///
/// Returns an error if the insert fails or the recipient does not exist.
pub fn create_notification(
    conn: &mut SqliteConnection,
    notification: &NewNotification,
) -> Result<(), PersistenceError> {
    diesel::insert_into(notifications::table)
        .values((
            notifications::recipient_id.eq(notification.recipient_id),
            notifications::evaluation_id.eq(notification.evaluation_id),
            notifications::kind.eq(notification.kind.as_str()),
            notifications::message.eq(&notification.message),
            notifications::created_at.eq(format_timestamp(notification.created_at)),
        ))
        .execute(conn)?;
    debug!(
        recipient_id = notification.recipient_id,
        kind = notification.kind.as_str(),
        "Created notification"
    );
    Ok(())
}
