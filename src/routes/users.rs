//! Back-office user directory.
//!
//! Identity and roles live in the external provider; this directory only
//! mirrors the users the service has seen, for the admin views.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::routes::{ListParams, PaginatedResponse};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Record that an authenticated user touched the service.
pub(crate) async fn touch_profile(db: &PgPool, identity: &Identity) -> ApiResult<()> {
    sqlx::query(
        "INSERT INTO user_profiles (id, created_at, last_seen_at) VALUES ($1, NOW(), NOW())
         ON CONFLICT (id) DO UPDATE SET last_seen_at = NOW()",
    )
    .bind(&identity.user_id)
    .execute(db)
    .await?;
    Ok(())
}

/// GET /api/v1/users - admin only.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<UserProfile>>> {
    identity.require_admin()?;
    let (page, per_page) = params.page_window();

    let profiles = sqlx::query_as::<_, UserProfile>(
        "SELECT * FROM user_profiles ORDER BY last_seen_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(PaginatedResponse { data: profiles, total, page }))
}

/// GET /api/v1/users/:id - admin only.
pub async fn get(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    identity.require_admin()?;
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user not found"))
}

/// DELETE /api/v1/users/:id - superadmin only.
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    identity.require_superadmin()?;
    let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
        .bind(&id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("user not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
