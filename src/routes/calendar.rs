//! Branch calendar administration endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::auth::Identity;
use crate::domain::{BranchName, BusinessHours, CalendarSettings};
use crate::error::{ApiError, ApiResult};
use crate::scheduling::{settings, SettingsUpdate};
use crate::AppState;

fn parse_branch(raw: String) -> ApiResult<BranchName> {
    BranchName::new(raw).map_err(|e| ApiError::validation(e.to_string()))
}

/// GET /api/v1/calendar/:branch - effective settings (stored or defaults).
pub async fn get_settings(
    State(state): State<AppState>,
    identity: Identity,
    Path(branch): Path<String>,
) -> ApiResult<Json<CalendarSettings>> {
    identity.require_admin()?;
    let branch = parse_branch(branch)?;
    Ok(Json(settings::effective_settings(&state.db, &branch).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettingsRequest {
    pub business_hours: BusinessHours,
    pub buffer_time_minutes: i32,
    #[serde(default = "default_disable_sundays")]
    pub disable_sundays: bool,
}

fn default_disable_sundays() -> bool {
    true
}

/// PUT/POST /api/v1/calendar/:branch - create-or-update the branch record.
pub async fn upsert_settings(
    State(state): State<AppState>,
    identity: Identity,
    Path(branch): Path<String>,
    Json(payload): Json<CalendarSettingsRequest>,
) -> ApiResult<Json<CalendarSettings>> {
    identity.require_admin()?;
    let branch = parse_branch(branch)?;
    let update = SettingsUpdate {
        business_hours: payload.business_hours,
        buffer_minutes: payload.buffer_time_minutes,
        disable_sundays: payload.disable_sundays,
    };
    let saved = settings::upsert_settings(&state.db, &branch, update, &identity.user_id).await?;
    Ok(Json(saved))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClosedDateRequest {
    pub date: NaiveDate,
    #[validate(length(max = 200, message = "reason must be at most 200 characters"))]
    #[serde(default)]
    pub reason: String,
}

/// POST /api/v1/calendar/:branch/closed-dates - set-add a closed date.
pub async fn add_closed_date(
    State(state): State<AppState>,
    identity: Identity,
    Path(branch): Path<String>,
    Json(payload): Json<ClosedDateRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    identity.require_admin()?;
    payload.validate()?;
    let branch = parse_branch(branch)?;
    let added = settings::add_closed_date(
        &state.db,
        &branch,
        payload.date,
        &payload.reason,
        &identity.user_id,
    )
    .await?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(serde_json::json!({ "added": added }))))
}

/// DELETE /api/v1/calendar/:branch/closed-dates/:date - set-remove.
pub async fn remove_closed_date(
    State(state): State<AppState>,
    identity: Identity,
    Path((branch, date)): Path<(String, NaiveDate)>,
) -> ApiResult<Json<serde_json::Value>> {
    identity.require_admin()?;
    let branch = parse_branch(branch)?;
    let removed = settings::remove_closed_date(&state.db, &branch, date).await?;
    if !removed {
        return Err(ApiError::not_found("date is not closed for this branch"));
    }
    Ok(Json(serde_json::json!({ "removed": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_payload_uses_contract_field_names() {
        let payload: CalendarSettingsRequest = serde_json::from_value(serde_json::json!({
            "businessHours": { "start": "09:00", "end": "17:00" },
            "bufferTimeMinutes": 60
        }))
        .unwrap();
        assert_eq!(payload.business_hours.start.to_string(), "09:00");
        assert_eq!(payload.buffer_time_minutes, 60);
        assert!(payload.disable_sundays, "sundays default to disabled");
    }

    #[test]
    fn closed_date_reason_is_bounded() {
        let payload = ClosedDateRequest {
            date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
            reason: "x".repeat(201),
        };
        assert!(payload.validate().is_err());
    }
}
