//! Session cart endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// One cart row joined with its product, priced at current catalog values.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub currency: String,
    pub line_total: i64,
}

pub(crate) async fn cart_lines(db: &PgPool, session: &str) -> ApiResult<Vec<CartLine>> {
    Ok(sqlx::query_as::<_, CartLine>(
        "SELECT c.product_id, p.name, p.sku, c.quantity, p.price AS unit_price, p.currency,
                (c.quantity::bigint * p.price) AS line_total
         FROM cart_items c
         JOIN products p ON p.id = c.product_id
         WHERE c.session_id = $1
         ORDER BY c.created_at",
    )
    .bind(session)
    .fetch_all(db)
    .await?)
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
}

/// GET /api/v1/cart/:session
pub async fn get_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    let items = cart_lines(&state.db, &session).await?;
    let subtotal = items.iter().map(|i| i.line_total).sum();
    Ok(Json(CartResponse { items, subtotal }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 999))]
    pub quantity: i32,
}

/// POST /api/v1/cart/:session - add or accumulate a line.
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> ApiResult<(StatusCode, Json<CartResponse>)> {
    payload.validate()?;

    let available: Option<bool> =
        sqlx::query_scalar("SELECT status = 'active' FROM products WHERE id = $1")
            .bind(payload.product_id)
            .fetch_optional(&state.db)
            .await?;
    match available {
        Some(true) => {}
        Some(false) => return Err(ApiError::conflict("product is not available")),
        None => return Err(ApiError::not_found("product not found")),
    }

    sqlx::query(
        "INSERT INTO cart_items (id, session_id, product_id, quantity, created_at)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT (session_id, product_id)
         DO UPDATE SET quantity = cart_items.quantity + $4",
    )
    .bind(Uuid::now_v7())
    .bind(&session)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .execute(&state.db)
    .await?;

    let items = cart_lines(&state.db, &session).await?;
    let subtotal = items.iter().map(|i| i.line_total).sum();
    Ok((StatusCode::CREATED, Json(CartResponse { items, subtotal })))
}

/// DELETE /api/v1/cart/:session/items/:product_id
pub async fn remove_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let result =
        sqlx::query("DELETE FROM cart_items WHERE session_id = $1 AND product_id = $2")
            .bind(&session)
            .bind(product_id)
            .execute(&state.db)
            .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("item is not in the cart"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cart/:session
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<StatusCode> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&session)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_request_bounds_quantity() {
        let ok = AddToCartRequest { product_id: Uuid::nil(), quantity: 3 };
        assert!(ok.validate().is_ok());
        let zero = AddToCartRequest { product_id: Uuid::nil(), quantity: 0 };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let lines = vec![
            CartLine {
                product_id: Uuid::nil(),
                name: "Disc harrow".into(),
                sku: "SKU-1".into(),
                quantity: 2,
                unit_price: 1500,
                currency: "USD".into(),
                line_total: 3000,
            },
            CartLine {
                product_id: Uuid::nil(),
                name: "Seed drill".into(),
                sku: "SKU-2".into(),
                quantity: 1,
                unit_price: 999,
                currency: "USD".into(),
                line_total: 999,
            },
        ];
        let subtotal: i64 = lines.iter().map(|i| i.line_total).sum();
        assert_eq!(subtotal, 3999);
    }
}
