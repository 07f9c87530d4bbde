// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduling settings mutations.

use cadence_domain::StoredSchedulingSettings;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::diesel_schema::scheduling_settings;
use crate::error::PersistenceError;

/// Inserts or replaces a store's settings row.
///
/// # Errors
///
/// Returns an error if the write fails or the store does not exist.
pub fn save_settings(
    conn: &mut SqliteConnection,
    store_id: i64,
    settings: &StoredSchedulingSettings,
) -> Result<(), PersistenceError> {
    diesel::replace_into(scheduling_settings::table)
        .values((
            scheduling_settings::store_id.eq(store_id),
            scheduling_settings::auto_schedule.eq(settings.auto_schedule.map(i32::from)),
            scheduling_settings::frequency.eq(settings.frequency),
            scheduling_settings::cycle_start.eq(settings.cycle_start.as_deref()),
            scheduling_settings::transition_mode.eq(settings.transition_mode.as_deref()),
            scheduling_settings::custom_start_date.eq(settings.custom_start_date.as_deref()),
            scheduling_settings::min_employment_days.eq(settings.min_employment_days),
            scheduling_settings::fiscal_year_start_month.eq(settings.fiscal_year_start_month),
            scheduling_settings::timezone.eq(settings.timezone.as_deref()),
            scheduling_settings::business_hours_open.eq(settings.business_hours_open.as_deref()),
            scheduling_settings::business_hours_close
                .eq(settings.business_hours_close.as_deref()),
        ))
        .execute(conn)?;
    info!(store_id, "Saved scheduling settings");
    Ok(())
}
