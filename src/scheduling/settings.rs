//! Calendar settings store.
//!
//! A branch with no stored row resolves to the documented defaults; closed
//! dates live in a child table keyed by (branch, date) so additions and
//! removals are atomic set operations rather than document rewrites.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::{BranchName, BusinessHours, CalendarSettings, ClosedDate, TimeOfDay};
use crate::error::{ApiError, ApiResult};

#[derive(sqlx::FromRow)]
struct SettingsRow {
    open_time: String,
    close_time: String,
    buffer_minutes: i32,
    disable_sundays: bool,
}

#[derive(sqlx::FromRow)]
struct ClosedDateRow {
    closed_on: NaiveDate,
    reason: String,
    added_by: String,
    added_at: DateTime<Utc>,
}

fn parse_stored_time(value: &str) -> ApiResult<TimeOfDay> {
    TimeOfDay::parse(value)
        .map_err(|e| ApiError::Internal(format!("stored time {value:?} is invalid: {e}")))
}

/// Explicit settings if present, defaults otherwise. Closed dates are
/// attached either way, since they can exist for a branch that never had
/// its hours configured.
pub async fn effective_settings(db: &PgPool, branch: &BranchName) -> ApiResult<CalendarSettings> {
    let row = sqlx::query_as::<_, SettingsRow>(
        "SELECT open_time, close_time, buffer_minutes, disable_sundays
         FROM branch_calendar_settings WHERE branch = $1",
    )
    .bind(branch.as_str())
    .fetch_optional(db)
    .await?;

    let mut settings = match row {
        Some(row) => CalendarSettings {
            branch: branch.clone(),
            business_hours: BusinessHours {
                start: parse_stored_time(&row.open_time)?,
                end: parse_stored_time(&row.close_time)?,
            },
            buffer_minutes: row.buffer_minutes,
            disable_sundays: row.disable_sundays,
            closed_dates: Vec::new(),
        },
        None => CalendarSettings::defaults(branch.clone()),
    };

    let closed = sqlx::query_as::<_, ClosedDateRow>(
        "SELECT closed_on, reason, added_by, added_at
         FROM branch_closed_dates WHERE branch = $1 ORDER BY closed_on",
    )
    .bind(branch.as_str())
    .fetch_all(db)
    .await?;

    settings.closed_dates = closed
        .into_iter()
        .map(|r| ClosedDate {
            date: r.closed_on,
            reason: r.reason,
            added_by: r.added_by,
            added_at: r.added_at,
        })
        .collect();

    Ok(settings)
}

#[derive(Clone, Debug)]
pub struct SettingsUpdate {
    pub business_hours: BusinessHours,
    pub buffer_minutes: i32,
    pub disable_sundays: bool,
}

impl SettingsUpdate {
    fn check(&self) -> ApiResult<()> {
        if self.business_hours.end <= self.business_hours.start {
            return Err(ApiError::validation("closing time must be after opening time"));
        }
        if self.buffer_minutes < 0 {
            return Err(ApiError::validation("buffer minutes must not be negative"));
        }
        Ok(())
    }
}

/// Create-or-update the single per-branch settings record.
pub async fn upsert_settings(
    db: &PgPool,
    branch: &BranchName,
    update: SettingsUpdate,
    updated_by: &str,
) -> ApiResult<CalendarSettings> {
    update.check()?;
    sqlx::query(
        "INSERT INTO branch_calendar_settings
             (branch, open_time, close_time, buffer_minutes, disable_sundays, updated_by, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW())
         ON CONFLICT (branch) DO UPDATE SET
             open_time = EXCLUDED.open_time,
             close_time = EXCLUDED.close_time,
             buffer_minutes = EXCLUDED.buffer_minutes,
             disable_sundays = EXCLUDED.disable_sundays,
             updated_by = EXCLUDED.updated_by,
             updated_at = NOW()",
    )
    .bind(branch.as_str())
    .bind(update.business_hours.start.to_string())
    .bind(update.business_hours.end.to_string())
    .bind(update.buffer_minutes)
    .bind(update.disable_sundays)
    .bind(updated_by)
    .execute(db)
    .await?;

    effective_settings(db, branch).await
}

/// Set-add: a date already present is left untouched. Returns whether a row
/// was inserted.
pub async fn add_closed_date(
    db: &PgPool,
    branch: &BranchName,
    date: NaiveDate,
    reason: &str,
    added_by: &str,
) -> ApiResult<bool> {
    let result = sqlx::query(
        "INSERT INTO branch_closed_dates (branch, closed_on, reason, added_by, added_at)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT (branch, closed_on) DO NOTHING",
    )
    .bind(branch.as_str())
    .bind(date)
    .bind(reason)
    .bind(added_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Set-remove. Returns whether the date was present.
pub async fn remove_closed_date(
    db: &PgPool,
    branch: &BranchName,
    date: NaiveDate,
) -> ApiResult<bool> {
    let result = sqlx::query("DELETE FROM branch_closed_dates WHERE branch = $1 AND closed_on = $2")
        .bind(branch.as_str())
        .bind(date)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(start: &str, end: &str) -> BusinessHours {
        BusinessHours {
            start: TimeOfDay::parse(start).unwrap(),
            end: TimeOfDay::parse(end).unwrap(),
        }
    }

    #[test]
    fn update_rejects_inverted_hours() {
        let update = SettingsUpdate {
            business_hours: hours("15:00", "08:00"),
            buffer_minutes: 60,
            disable_sundays: true,
        };
        assert!(update.check().is_err());
    }

    #[test]
    fn update_rejects_zero_length_day() {
        let update = SettingsUpdate {
            business_hours: hours("09:00", "09:00"),
            buffer_minutes: 0,
            disable_sundays: false,
        };
        assert!(update.check().is_err());
    }

    #[test]
    fn update_accepts_sane_values() {
        let update = SettingsUpdate {
            business_hours: hours("09:00", "17:30"),
            buffer_minutes: 0,
            disable_sundays: false,
        };
        assert!(update.check().is_ok());
    }
}
