//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::routes::{ListParams, PaginatedResponse};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub compare_at_price: Option<i64>,
    pub currency: String,
    pub category_id: Option<Uuid>,
    pub inventory_quantity: i32,
    pub status: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// GET /api/v1/products - active products, paginated, with optional search
/// and category filters.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<Product>>> {
    let (page, per_page) = params.page_window();
    let search = params.search.as_deref();

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products
         WHERE status = 'active'
           AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
           AND ($4::uuid IS NULL OR category_id = $4)
         ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .bind(search)
    .bind(params.category)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products
         WHERE status = 'active'
           AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
           AND ($2::uuid IS NULL OR category_id = $2)",
    )
    .bind(search)
    .bind(params.category)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(PaginatedResponse { data: products, total, page }))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product not found"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: i64,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub inventory_quantity: Option<i32>,
}

/// POST /api/v1/products - admin only.
pub async fn create_product(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    identity.require_admin()?;
    payload.validate()?;

    let sku = format!("SKU-{:08}", rand::random::<u32>() % 100_000_000);
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products
             (id, sku, name, description, price, currency, category_id, inventory_quantity,
              status, images, tags, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, 'USD', $6, $7, 'active', '{}', '{}', NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&sku)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.category_id)
    .bind(payload.inventory_quantity.unwrap_or(0))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/v1/products/:id - admin only.
pub async fn update_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> ApiResult<Json<Product>> {
    identity.require_admin()?;
    payload.validate()?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET name = $2, description = $3, price = $4, category_id = $5,
             inventory_quantity = $6, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.category_id)
    .bind(payload.inventory_quantity.unwrap_or(0))
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("product not found"))?;

    Ok(Json(product))
}

/// DELETE /api/v1/products/:id - admin only, soft delete.
pub async fn delete_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    identity.require_admin()?;
    let result = sqlx::query("UPDATE products SET status = 'deleted', updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("product not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(categories))
}

/// GET /api/v1/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("category not found"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// POST /api/v1/categories - admin only.
pub async fn create_category(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    identity.require_admin()?;
    payload.validate()?;

    let slug = payload.name.to_lowercase().replace(' ', "-");
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, parent_id, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&payload.name)
    .bind(&slug)
    .bind(&payload.description)
    .bind(payload.parent_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_payload_rejects_negative_price() {
        let payload = ProductRequest {
            name: "Grain auger".into(),
            description: None,
            price: -1,
            category_id: None,
            inventory_quantity: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn category_slug_is_derived_from_name() {
        let slug = "Farm Machinery".to_lowercase().replace(' ', "-");
        assert_eq!(slug, "farm-machinery");
    }
}
