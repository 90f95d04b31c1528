//! Appointment booking endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::domain::{Appointment, AppointmentStatus, BranchName, TimeOfDay};
use crate::error::{ApiError, ApiResult};
use crate::events::AppEvent;
use crate::routes::users;
use crate::scheduling::{ledger, NewAppointment};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub branch: BranchName,
    pub preferred_date: NaiveDate,
    pub preferred_time: TimeOfDay,
    #[validate(length(min = 1, max = 200, message = "purpose must be 1-200 characters"))]
    pub purpose: String,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// POST /api/v1/appointments
///
/// The duplicate check is the insert itself (unique index on the active
/// natural key), so two racing requests for the same slot cannot both land.
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<BookAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    payload.validate()?;
    users::touch_profile(&state.db, &identity).await?;

    let appointment = ledger::create(
        &state.db,
        NewAppointment {
            branch: payload.branch,
            preferred_date: payload.preferred_date,
            preferred_time: payload.preferred_time,
            purpose: payload.purpose,
            user_id: identity.user_id.clone(),
            product_id: payload.product_id,
        },
    )
    .await?;

    state
        .publish(AppEvent::AppointmentBooked {
            appointment_id: appointment.id,
            branch: appointment.branch.clone(),
            date: appointment.preferred_date,
            time: appointment.preferred_time.clone(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: appointment.id })))
}

#[derive(Debug, Deserialize)]
pub struct AppointmentFilters {
    pub branch: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// GET /api/v1/appointments - own bookings; admins see all, with filters.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(filters): Query<AppointmentFilters>,
) -> ApiResult<Json<Vec<Appointment>>> {
    if !identity.is_admin() {
        return Ok(Json(ledger::list_for_user(&state.db, &identity.user_id).await?));
    }

    let branch = filters
        .branch
        .map(BranchName::new)
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    let status = filters
        .status
        .map(|s| s.parse::<AppointmentStatus>())
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    Ok(Json(
        ledger::list_all(&state.db, branch.as_ref(), filters.date, status).await?,
    ))
}

/// DELETE /api/v1/appointments/:id - owner cancellation.
pub async fn cancel(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let today = Utc::now().date_naive();
    let appointment = ledger::cancel(&state.db, id, &identity.user_id, today).await?;

    state
        .publish(AppEvent::AppointmentCancelled {
            appointment_id: appointment.id,
            branch: appointment.branch.clone(),
        })
        .await;

    Ok(Json(serde_json::json!({ "cancelled": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: String,
    #[serde(default)]
    pub marked_by_admin: bool,
}

/// PATCH /api/v1/appointments/:id/status - admin only. Transitions are not
/// gated by a state machine; any recognized status value is accepted.
pub async fn update_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> ApiResult<Json<Appointment>> {
    identity.require_admin()?;
    let status: AppointmentStatus = payload
        .status
        .parse()
        .map_err(|e: crate::domain::appointment::UnknownStatus| ApiError::validation(e.to_string()))?;

    let appointment =
        ledger::update_status(&state.db, id, status, payload.marked_by_admin).await?;
    Ok(Json(appointment))
}

/// POST /api/v1/appointments/auto-complete - externally triggered sweep.
pub async fn auto_complete(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<serde_json::Value>> {
    identity.require_admin()?;
    let count = ledger::auto_complete_overdue(&state.db, Utc::now().date_naive()).await?;
    if count > 0 {
        state.publish(AppEvent::AppointmentsAutoCompleted { count }).await;
    }
    Ok(Json(serde_json::json!({ "count": count })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_payload_validates_purpose_length() {
        let payload: BookAppointmentRequest = serde_json::from_value(serde_json::json!({
            "branch": "Main",
            "preferredDate": "2026-09-01",
            "preferredTime": "10:00",
            "purpose": ""
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn booking_payload_rejects_malformed_time_at_the_boundary() {
        let result = serde_json::from_value::<BookAppointmentRequest>(serde_json::json!({
            "branch": "Main",
            "preferredDate": "2026-09-01",
            "preferredTime": "25:00",
            "purpose": "pickup"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn booking_payload_normalizes_branch() {
        let payload: BookAppointmentRequest = serde_json::from_value(serde_json::json!({
            "branch": "  Main ",
            "preferredDate": "2026-09-01",
            "preferredTime": "10:00",
            "purpose": "product consultation"
        }))
        .unwrap();
        assert_eq!(payload.branch.as_str(), "main");
        assert!(payload.validate().is_ok());
    }
}
