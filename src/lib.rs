//! Tradepoint - storefront and branch appointment scheduling
//!
//! Web service for a trading company's customer portal.
//!
//! ## Features
//! - Product catalog, cart and checkout against an external payment gateway
//! - Branch appointment booking with per-branch availability windows
//! - Back-office: calendar settings, sales, feedback, announcements, users

use crate::events::AppEvent;

pub mod auth;
pub mod domain;
pub mod error;
pub mod events;
pub mod routes;
pub mod scheduling;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
    pub checkout_base_url: String,
}

impl AppState {
    pub async fn publish(&self, event: AppEvent) {
        events::publish(&self.nats, event).await;
    }
}
