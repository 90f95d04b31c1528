//! Availability query endpoint.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{availability, BranchName, DayAvailability};
use crate::error::{ApiError, ApiResult};
use crate::scheduling::{ledger, settings};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub branch: Option<String>,
    pub date: Option<String>,
}

/// GET /api/v1/appointments/availability?branch=..&date=YYYY-MM-DD
///
/// Missing parameters are caller errors rejected before any computation; a
/// closed day answers 200 with an `error` body and no slots, per the
/// storefront contract.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityQuery>,
) -> ApiResult<Json<DayAvailability>> {
    let branch = params
        .branch
        .ok_or_else(|| ApiError::validation("branch is required"))?;
    let date = params
        .date
        .ok_or_else(|| ApiError::validation("date is required"))?;

    let branch = BranchName::new(branch).map_err(|e| ApiError::validation(e.to_string()))?;
    let date: NaiveDate = date
        .parse()
        .map_err(|_| ApiError::validation("date must be formatted as YYYY-MM-DD"))?;

    let settings = settings::effective_settings(&state.db, &branch).await?;

    // Day-level gates first; a closed day never touches the ledger.
    if availability::closure_reason(&settings, date).is_some() {
        return Ok(Json(availability::day_availability(&settings, date, &[])));
    }

    let booked = ledger::active_times_for_day(&state.db, &branch, date).await?;
    Ok(Json(availability::day_availability(&settings, date, &booked)))
}
