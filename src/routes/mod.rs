//! HTTP surface.

pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod cart;
pub mod catalog;
pub mod engagement;
pub mod orders;
pub mod users;

use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

impl ListParams {
    /// Clamped (page, per_page), defaulting to page 1 and 20 per page.
    pub fn page_window(&self) -> (u32, u32) {
        (self.page.unwrap_or(1).max(1), self.per_page.unwrap_or(20).min(100))
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Storefront
        .route(
            "/api/v1/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/v1/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/api/v1/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/api/v1/categories/:id", get(catalog::get_category))
        .route(
            "/api/v1/cart/:session",
            get(cart::get_cart).post(cart::add_to_cart).delete(cart::clear_cart),
        )
        .route("/api/v1/cart/:session/items/:product_id", delete(cart::remove_item))
        .route("/api/v1/checkout", post(orders::checkout))
        .route("/api/v1/payments/webhook", post(orders::payment_webhook))
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/orders/:id", get(orders::get_order))
        // Appointments
        .route("/api/v1/appointments/availability", get(availability::get_availability))
        .route(
            "/api/v1/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/api/v1/appointments/auto-complete", post(appointments::auto_complete))
        .route("/api/v1/appointments/:id", delete(appointments::cancel))
        .route("/api/v1/appointments/:id/status", patch(appointments::update_status))
        // Branch calendar administration
        .route(
            "/api/v1/calendar/:branch",
            get(calendar::get_settings)
                .put(calendar::upsert_settings)
                .post(calendar::upsert_settings),
        )
        .route(
            "/api/v1/calendar/:branch/closed-dates",
            post(calendar::add_closed_date),
        )
        .route(
            "/api/v1/calendar/:branch/closed-dates/:date",
            delete(calendar::remove_closed_date),
        )
        // Engagement and back-office
        .route(
            "/api/v1/feedback",
            get(engagement::list_feedback).post(engagement::submit_feedback),
        )
        .route("/api/v1/feedback/:id", delete(engagement::delete_feedback))
        .route(
            "/api/v1/announcements",
            get(engagement::list_announcements).post(engagement::create_announcement),
        )
        .route(
            "/api/v1/announcements/:id",
            axum::routing::put(engagement::update_announcement)
                .delete(engagement::delete_announcement),
        )
        .route("/api/v1/users", get(users::list))
        .route("/api/v1/users/:id", get(users::get).delete(users::remove))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "tradepoint" }))
}
