//! Booking lifecycle controller over the appointment ledger.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::appointment::{meets_cancellation_lead_time, overdue_cutoff, MIN_CANCEL_LEAD_DAYS};
use crate::domain::{Appointment, AppointmentStatus, BranchName, TimeOfDay};
use crate::error::{ApiError, ApiResult};

const APPOINTMENT_COLUMNS: &str = "id, branch, preferred_date, preferred_time, purpose, status, \
     user_id, product_id, created_at, last_updated, completed_by, completed_at";

#[derive(Clone, Debug)]
pub struct NewAppointment {
    pub branch: BranchName,
    pub preferred_date: NaiveDate,
    pub preferred_time: TimeOfDay,
    pub purpose: String,
    pub user_id: String,
    pub product_id: Option<Uuid>,
}

/// Insert a new scheduled appointment.
///
/// Duplicate prevention is the partial unique index over the active natural
/// key, so the conflict check and the insert are one atomic statement; a
/// unique violation surfaces as a conflict, never as a generic failure.
pub async fn create(db: &PgPool, new: NewAppointment) -> ApiResult<Appointment> {
    let query = format!(
        "INSERT INTO appointments
             (id, branch, preferred_date, preferred_time, purpose, status, user_id, product_id, created_at, last_updated)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
         RETURNING {APPOINTMENT_COLUMNS}"
    );
    let result = sqlx::query_as::<_, Appointment>(&query)
        .bind(Uuid::new_v4())
        .bind(new.branch.as_str())
        .bind(new.preferred_date)
        .bind(new.preferred_time.to_string())
        .bind(&new.purpose)
        .bind(AppointmentStatus::Scheduled.as_str())
        .bind(&new.user_id)
        .bind(new.product_id)
        .fetch_one(db)
        .await;

    match result {
        Ok(appointment) => Ok(appointment),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(ApiError::conflict(
            "an appointment already exists for this branch, date, time and purpose",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Nominal times of active appointments for one branch day, chronological.
pub async fn active_times_for_day(
    db: &PgPool,
    branch: &BranchName,
    date: NaiveDate,
) -> ApiResult<Vec<TimeOfDay>> {
    let times: Vec<String> = sqlx::query_scalar(
        "SELECT preferred_time FROM appointments
         WHERE branch = $1 AND preferred_date = $2 AND status NOT IN ('cancelled', 'rejected')
         ORDER BY preferred_time",
    )
    .bind(branch.as_str())
    .bind(date)
    .fetch_all(db)
    .await?;

    times
        .iter()
        .map(|t| {
            TimeOfDay::parse(t)
                .map_err(|e| ApiError::Internal(format!("stored time {t:?} is invalid: {e}")))
        })
        .collect()
}

pub async fn find(db: &PgPool, id: Uuid) -> ApiResult<Option<Appointment>> {
    let query = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1");
    Ok(sqlx::query_as::<_, Appointment>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn list_for_user(db: &PgPool, user_id: &str) -> ApiResult<Vec<Appointment>> {
    let query = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE user_id = $1 ORDER BY preferred_date DESC, preferred_time"
    );
    Ok(sqlx::query_as::<_, Appointment>(&query)
        .bind(user_id)
        .fetch_all(db)
        .await?)
}

/// Back-office listing with optional filters.
pub async fn list_all(
    db: &PgPool,
    branch: Option<&BranchName>,
    date: Option<NaiveDate>,
    status: Option<AppointmentStatus>,
) -> ApiResult<Vec<Appointment>> {
    let query = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE ($1::text IS NULL OR branch = $1)
           AND ($2::date IS NULL OR preferred_date = $2)
           AND ($3::text IS NULL OR status = $3)
         ORDER BY preferred_date DESC, preferred_time"
    );
    Ok(sqlx::query_as::<_, Appointment>(&query)
        .bind(branch.map(BranchName::as_str))
        .bind(date)
        .bind(status.map(AppointmentStatus::as_str))
        .fetch_all(db)
        .await?)
}

/// Owner cancellation. Removes the record outright; the ledger keeps no
/// tombstone for customer-cancelled bookings.
pub async fn cancel(
    db: &PgPool,
    id: Uuid,
    user_id: &str,
    today: NaiveDate,
) -> ApiResult<Appointment> {
    let appointment = find(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("appointment not found"))?;

    if !appointment.is_owned_by(user_id) {
        return Err(ApiError::Forbidden("appointment belongs to another user".into()));
    }
    if appointment.parsed_status().ok() == Some(AppointmentStatus::Cancelled) {
        return Err(ApiError::conflict("appointment is already cancelled"));
    }
    if !meets_cancellation_lead_time(appointment.preferred_date, today) {
        return Err(ApiError::conflict(format!(
            "appointments must be cancelled at least {MIN_CANCEL_LEAD_DAYS} days in advance"
        )));
    }

    sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(appointment)
}

/// Free-form admin status update; no transition table is enforced.
pub async fn update_status(
    db: &PgPool,
    id: Uuid,
    status: AppointmentStatus,
    marked_by_admin: bool,
) -> ApiResult<Appointment> {
    let query = if marked_by_admin {
        format!(
            "UPDATE appointments
             SET status = $2, last_updated = NOW(), completed_by = 'admin', completed_at = NOW()
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        )
    } else {
        format!(
            "UPDATE appointments SET status = $2, last_updated = NOW()
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        )
    };
    sqlx::query_as::<_, Appointment>(&query)
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::not_found("appointment not found"))
}

/// Sweep overdue appointments into `auto-completed`.
///
/// A single conditional UPDATE, so concurrent runs and re-runs only touch
/// rows still outside the terminal set.
pub async fn auto_complete_overdue(db: &PgPool, today: NaiveDate) -> ApiResult<u64> {
    let result = sqlx::query(
        "UPDATE appointments
         SET status = 'auto-completed', completed_by = 'system', completed_at = NOW(), last_updated = NOW()
         WHERE preferred_date <= $1
           AND status NOT IN ('completed', 'auto-completed', 'cancelled', 'rejected')",
    )
    .bind(overdue_cutoff(today))
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}
