//! Orders, checkout and the payment gateway boundary.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::events::AppEvent;
use crate::routes::cart::cart_lines;
use crate::routes::{ListParams, PaginatedResponse};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<String>,
    pub customer_email: String,
    pub status: String,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub total: i64,
    pub currency: String,
    pub shipping_address: serde_json::Value,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(email)]
    pub customer_email: String,
    #[serde(default)]
    pub shipping_address: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub total: i64,
    pub currency: String,
    pub checkout_url: String,
}

/// POST /api/v1/checkout - materialize the session cart into an order and
/// hand the caller a gateway checkout session URL. Payment confirmation
/// arrives asynchronously on the webhook.
pub async fn checkout(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    payload.validate()?;

    let lines = cart_lines(&state.db, &payload.session_id).await?;
    if lines.is_empty() {
        return Err(ApiError::validation("cart is empty"));
    }

    let subtotal: i64 = lines.iter().map(|l| l.line_total).sum();
    let currency = lines[0].currency.clone();
    let order_number = format!("ORD-{:08}", rand::random::<u32>() % 100_000_000);
    let order_id = Uuid::now_v7();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        "INSERT INTO orders
             (id, order_number, customer_id, customer_email, status, subtotal, tax, shipping,
              total, currency, shipping_address, payment_status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, 'pending', $5, 0, 0, $5, $6, $7, 'pending', NOW(), NOW())",
    )
    .bind(order_id)
    .bind(&order_number)
    .bind(&identity.user_id)
    .bind(&payload.customer_email)
    .bind(subtotal)
    .bind(&currency)
    .bind(&payload.shipping_address)
    .execute(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, sku, name, quantity, unit_price, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.sku)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.line_total)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&payload.session_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    state
        .publish(AppEvent::OrderPlaced {
            order_id,
            total: subtotal,
            currency: currency.clone(),
        })
        .await;

    let checkout_url = format!("{}/session/{}", state.checkout_base_url, order_id);
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id,
            order_number,
            total: subtotal,
            currency,
            checkout_url,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub order_id: Uuid,
    pub status: String,
}

/// POST /api/v1/payments/webhook - asynchronous gateway status callback.
/// A settled payment confirms the order and draws down inventory.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> ApiResult<Json<serde_json::Value>> {
    let (payment_status, order_status) = match payload.status.as_str() {
        "paid" => ("paid", Some("confirmed")),
        "failed" => ("failed", None),
        "expired" => ("expired", None),
        other => {
            return Err(ApiError::validation(format!(
                "unrecognized payment status: {other}"
            )))
        }
    };

    let updated = match order_status {
        Some(order_status) => sqlx::query(
            "UPDATE orders SET payment_status = $2, status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(payload.order_id)
        .bind(payment_status)
        .bind(order_status)
        .execute(&state.db)
        .await?,
        None => sqlx::query("UPDATE orders SET payment_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(payload.order_id)
            .bind(payment_status)
            .execute(&state.db)
            .await?,
    };
    if updated.rows_affected() == 0 {
        return Err(ApiError::not_found("order not found"));
    }

    if payment_status == "paid" {
        sqlx::query(
            "UPDATE products p
             SET inventory_quantity = p.inventory_quantity - oi.quantity, updated_at = NOW()
             FROM order_items oi
             WHERE oi.order_id = $1 AND p.id = oi.product_id",
        )
        .bind(payload.order_id)
        .execute(&state.db)
        .await?;
    }

    state
        .publish(AppEvent::PaymentSettled {
            order_id: payload.order_id,
            status: payment_status.to_string(),
        })
        .await;

    Ok(Json(serde_json::json!({ "received": true })))
}

/// GET /api/v1/orders - back-office sales listing.
pub async fn list_orders(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<Order>>> {
    identity.require_admin()?;
    let (page, per_page) = params.page_window();

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(PaginatedResponse { data: orders, total, page }))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// GET /api/v1/orders/:id - the owner or any admin.
pub async fn get_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderDetail>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    if !identity.is_admin() && order.customer_id.as_deref() != Some(identity.user_id.as_str()) {
        return Err(ApiError::Forbidden("order belongs to another customer".into()));
    }

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY name",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(OrderDetail { order, items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_payload_requires_valid_email() {
        let bad = CheckoutRequest {
            session_id: "s-1".into(),
            customer_email: "not-an-email".into(),
            shipping_address: serde_json::Value::Null,
        };
        assert!(bad.validate().is_err());

        let ok = CheckoutRequest {
            session_id: "s-1".into(),
            customer_email: "buyer@example.com".into(),
            shipping_address: serde_json::json!({ "city": "Jos" }),
        };
        assert!(ok.validate().is_ok());
    }
}
