//! Order CRUD, line item and status transition endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{
    Currency, CustomerInfo, NewOrder, NewOrderItem, Order, OrderAction, OrderId, OrderItem,
    OrderItemId, ProductId,
};
use serde::{Deserialize, Serialize};

use super::{ActingUser, AppState, ListQuery, MoneyResponse, PageResponse, money_from_request};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub tax_number: String,
    pub email: String,
    pub currency: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub customer_name: String,
    pub tax_number: String,
    pub email: String,
}

/// A line item. Without `price_cents` the product's list price is used.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: Option<u32>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub version: i64,
    pub customer: CustomerResponse,
    pub status: String,
    pub currency: String,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: MoneyResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "_links")]
    pub links: BTreeMap<&'static str, Link>,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub name: String,
    pub tax_number: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub price: MoneyResponse,
    pub total: Option<MoneyResponse>,
}

/// A hypermedia link to a follow-up request.
#[derive(Debug, Serialize)]
pub struct Link {
    pub href: String,
    pub method: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ItemAddedResponse {
    pub item_id: String,
    pub order: OrderResponse,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let customer = order.customer_info();
        Self {
            id: order.id().to_string(),
            version: order.version().as_i64(),
            customer: CustomerResponse {
                name: customer.name().to_string(),
                tax_number: customer.tax_number().to_string(),
                email: customer.email().to_string(),
            },
            status: order.status().to_string(),
            currency: order.currency().to_string(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount().into(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
            links: links(order),
        }
    }
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id().to_string(),
            product_id: item.product_id().to_string(),
            quantity: item.quantity(),
            price: item.price().into(),
            total: item.total().ok().as_ref().map(MoneyResponse::from),
        }
    }
}

/// Path segment of the route that performs `action`.
pub fn action_path(action: OrderAction) -> &'static str {
    match action {
        OrderAction::Confirm => "confirm",
        OrderAction::MarkPaymentReceived => "payment",
        OrderAction::StartProduction => "production",
        OrderAction::StartDelivery => "delivery",
        OrderAction::CompleteBilling => "billing",
        OrderAction::Cancel => "cancel",
    }
}

fn action_rel(action: OrderAction) -> &'static str {
    match action {
        OrderAction::Confirm => "confirm",
        OrderAction::MarkPaymentReceived => "mark_payment_received",
        OrderAction::StartProduction => "start_production",
        OrderAction::StartDelivery => "start_delivery",
        OrderAction::CompleteBilling => "complete_billing",
        OrderAction::Cancel => "cancel",
    }
}

fn links(order: &Order) -> BTreeMap<&'static str, Link> {
    let base = format!("/orders/{}", order.id());
    let mut links = BTreeMap::new();
    for action in order.status().available_actions() {
        links.insert(
            action_rel(action),
            Link {
                href: format!("{base}/{}", action_path(action)),
                method: "POST",
            },
        );
    }
    links.insert(
        "self",
        Link {
            href: base,
            method: "GET",
        },
    );
    links
}

// -- Handlers --

/// GET /orders: list orders, optionally filtered by `q`.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    let (limit, offset) = (query.limit(), query.offset());
    let page = match query.search() {
        Some(q) => state.orders.search_orders(q, limit, offset).await?,
        None => state.orders.orders_page(limit, offset).await?,
    };

    Ok(Json(PageResponse {
        items: page.items.iter().map(OrderResponse::from).collect(),
        total: page.total,
        limit,
        offset,
    }))
}

/// POST /orders: create a new order with optional items.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let currency = match req.currency.as_deref() {
        Some(code) => Currency::new(code)?,
        None => state.default_currency.clone(),
    };

    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        items.push(resolve_item(&state, item, &currency).await?);
    }

    let input = NewOrder::new(req.customer_name, req.tax_number, req.email).with_currency(currency);
    let order = state.orders.create_order_with_items(input, items).await?;
    state.notifications.notify_order_change(&user);

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders/{id}: load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id)?;
    let order = state
        .orders
        .get_order(&order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))?;

    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}: replace the customer info.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id)?;
    let info = CustomerInfo::new(req.customer_name, req.tax_number, req.email)?;
    let order = state.orders.update_customer(&order_id, info).await?;
    state.notifications.notify_order_change(&user);

    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> Result<StatusCode, ApiError> {
    let order_id = OrderId::new(id)?;
    if !state.orders.delete_order(&order_id).await? {
        return Err(ApiError::NotFound(format!("Order {order_id} not found")));
    }
    state.notifications.notify_order_change(&user);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders/{id}/items: add a line item.
#[tracing::instrument(skip(state, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    Json(req): Json<OrderItemRequest>,
) -> Result<(StatusCode, Json<ItemAddedResponse>), ApiError> {
    let order_id = OrderId::new(id)?;
    let currency = order_currency(&state, &order_id).await?;

    let item = resolve_item(&state, &req, &currency).await?;
    let (order, item_id) = state.orders.add_item(&order_id, item).await?;
    state.notifications.notify_order_change(&user);

    Ok((
        StatusCode::CREATED,
        Json(ItemAddedResponse {
            item_id: item_id.to_string(),
            order: OrderResponse::from(&order),
        }),
    ))
}

/// PATCH /orders/{id}/items/{item_id}: change quantity and/or price.
#[tracing::instrument(skip(state, req))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(String, String)>,
    ActingUser(user): ActingUser,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id)?;
    let item_id = OrderItemId::new(item_id)?;

    if req.quantity.is_none() && req.price_cents.is_none() {
        return Err(ApiError::BadRequest(
            "Nothing to update: give quantity or price_cents".to_string(),
        ));
    }

    let price = match req.price_cents {
        Some(cents) => {
            let currency = order_currency(&state, &order_id).await?;
            Some(money_from_request(cents, req.currency.as_deref(), &currency)?)
        }
        None => None,
    };

    let order = state
        .orders
        .update_item(&order_id, &item_id, req.quantity, price)
        .await?;
    state.notifications.notify_order_change(&user);

    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /orders/{id}/items/{item_id}
#[tracing::instrument(skip(state))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(String, String)>,
    ActingUser(user): ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id)?;
    let item_id = OrderItemId::new(item_id)?;
    let order = state.orders.remove_item(&order_id, &item_id).await?;
    state.notifications.notify_order_change(&user);

    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/recalculate
#[tracing::instrument(skip(state))]
pub async fn recalculate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id)?;
    let order = state.orders.recalculate_total(&order_id).await?;
    state.notifications.notify_order_change(&user);

    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/confirm
pub async fn confirm(
    state: State<Arc<AppState>>,
    path: Path<String>,
    user: ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    transition(state, path, user, OrderAction::Confirm).await
}

/// POST /orders/{id}/payment
pub async fn mark_payment_received(
    state: State<Arc<AppState>>,
    path: Path<String>,
    user: ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    transition(state, path, user, OrderAction::MarkPaymentReceived).await
}

/// POST /orders/{id}/production
pub async fn start_production(
    state: State<Arc<AppState>>,
    path: Path<String>,
    user: ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    transition(state, path, user, OrderAction::StartProduction).await
}

/// POST /orders/{id}/delivery
pub async fn start_delivery(
    state: State<Arc<AppState>>,
    path: Path<String>,
    user: ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    transition(state, path, user, OrderAction::StartDelivery).await
}

/// POST /orders/{id}/billing
pub async fn complete_billing(
    state: State<Arc<AppState>>,
    path: Path<String>,
    user: ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    transition(state, path, user, OrderAction::CompleteBilling).await
}

/// POST /orders/{id}/cancel
pub async fn cancel(
    state: State<Arc<AppState>>,
    path: Path<String>,
    user: ActingUser,
) -> Result<Json<OrderResponse>, ApiError> {
    transition(state, path, user, OrderAction::Cancel).await
}

#[tracing::instrument(skip(state))]
async fn transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ActingUser(user): ActingUser,
    action: OrderAction,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id)?;
    let order = state.orders.apply_action(&order_id, action).await?;
    state.notifications.notify_order_change(&user);

    Ok(Json(OrderResponse::from(&order)))
}

async fn order_currency(state: &AppState, order_id: &OrderId) -> Result<Currency, ApiError> {
    state
        .orders
        .get_order(order_id)
        .await?
        .map(|order| order.currency().clone())
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))
}

async fn resolve_item(
    state: &AppState,
    req: &OrderItemRequest,
    order_currency: &Currency,
) -> Result<NewOrderItem, ApiError> {
    let product_id = ProductId::new(req.product_id.as_str())?;
    let price = match req.price_cents {
        Some(cents) => money_from_request(cents, req.currency.as_deref(), order_currency)?,
        None => state
            .products
            .get_product(&product_id)
            .await?
            .map(|product| product.price().clone())
            .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?,
    };

    Ok(NewOrderItem::new(product_id, req.quantity, price))
}
