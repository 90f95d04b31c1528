//! Customer feedback and announcements.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::routes::users;
use crate::routes::{ListParams, PaginatedResponse};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: String,
    pub subject: String,
    pub message: String,
    pub rating: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 120))]
    pub subject: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
}

/// POST /api/v1/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<FeedbackRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    payload.validate()?;
    users::touch_profile(&state.db, &identity).await?;

    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO feedback (id, user_id, subject, message, rating, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW())",
    )
    .bind(id)
    .bind(&identity.user_id)
    .bind(&payload.subject)
    .bind(&payload.message)
    .bind(payload.rating)
    .execute(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// GET /api/v1/feedback - admin only.
pub async fn list_feedback(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<Feedback>>> {
    identity.require_admin()?;
    let (page, per_page) = params.page_window();

    let entries = sqlx::query_as::<_, Feedback>(
        "SELECT * FROM feedback ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(PaginatedResponse { data: entries, total, page }))
}

/// DELETE /api/v1/feedback/:id - admin only.
pub async fn delete_feedback(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    identity.require_admin()?;
    let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("feedback not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GET /api/v1/announcements - published entries for everyone; admins also
/// see drafts.
pub async fn list_announcements(
    State(state): State<AppState>,
    identity: Option<Identity>,
) -> ApiResult<Json<Vec<Announcement>>> {
    let include_drafts = identity.as_ref().is_some_and(Identity::is_admin);
    let entries = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements WHERE published OR $1 ORDER BY created_at DESC",
    )
    .bind(include_drafts)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnnouncementRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

/// POST /api/v1/announcements - admin only.
pub async fn create_announcement(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<AnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    identity.require_admin()?;
    payload.validate()?;

    let entry = sqlx::query_as::<_, Announcement>(
        "INSERT INTO announcements (id, title, body, published, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&payload.title)
    .bind(&payload.body)
    .bind(payload.published)
    .bind(&identity.user_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/announcements/:id - admin only.
pub async fn update_announcement(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnnouncementRequest>,
) -> ApiResult<Json<Announcement>> {
    identity.require_admin()?;
    payload.validate()?;

    sqlx::query_as::<_, Announcement>(
        "UPDATE announcements SET title = $2, body = $3, published = $4, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.body)
    .bind(payload.published)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("announcement not found"))
}

/// DELETE /api/v1/announcements/:id - admin only.
pub async fn delete_announcement(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    identity.require_admin()?;
    let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("announcement not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_rating_is_bounded() {
        let payload = FeedbackRequest {
            subject: "Slow delivery".into(),
            message: "Order took three weeks.".into(),
            rating: Some(6),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn announcement_defaults_to_published() {
        let payload: AnnouncementRequest = serde_json::from_value(serde_json::json!({
            "title": "Holiday hours",
            "body": "All branches close early on Dec 24."
        }))
        .unwrap();
        assert!(payload.published);
        assert!(payload.validate().is_ok());
    }
}
