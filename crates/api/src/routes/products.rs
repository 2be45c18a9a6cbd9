//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{Product, ProductId};
use serde::{Deserialize, Serialize};

use super::{ActingUser, AppState, ListQuery, MoneyResponse, PageResponse, money_from_request};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub version: i64,
    pub name: String,
    pub price: MoneyResponse,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            version: product.version().as_i64(),
            name: product.name().to_string(),
            price: product.price().into(),
        }
    }
}

/// GET /products: list products by name, optionally filtered by `q`.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ProductResponse>>, ApiError> {
    let (limit, offset) = (query.limit(), query.offset());
    let page = match query.search() {
        Some(q) => state.products.search_products(q, limit, offset).await?,
        None => state.products.products_page(limit, offset).await?,
    };

    Ok(Json(PageResponse {
        items: page.items.iter().map(ProductResponse::from).collect(),
        total: page.total,
        limit,
        offset,
    }))
}

/// POST /products
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let price = money_from_request(req.price_cents, req.currency.as_deref(), &state.default_currency)?;
    let product = state.products.create_product(&req.name, price).await?;
    state.notifications.notify_product_change(&user);

    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(id)?;
    let product = state
        .products
        .get_product(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    Ok(Json(ProductResponse::from(&product)))
}

/// PUT /products/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(id)?;
    let price = money_from_request(req.price_cents, req.currency.as_deref(), &state.default_currency)?;
    let product = state
        .products
        .update_product(&product_id, &req.name, price)
        .await?;
    state.notifications.notify_product_change(&user);

    Ok(Json(ProductResponse::from(&product)))
}

/// DELETE /products/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> Result<StatusCode, ApiError> {
    let product_id = ProductId::new(id)?;
    if !state.products.delete_product(&product_id).await? {
        return Err(ApiError::NotFound(format!("Product {product_id} not found")));
    }
    state.notifications.notify_product_change(&user);

    Ok(StatusCode::NO_CONTENT)
}
