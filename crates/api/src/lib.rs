//! HTTP API server for order management.
//!
//! Provides REST endpoints for orders and products, a server-sent events
//! stream of change notifications, structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use common::{IdGenerator, RandomIdGenerator};
use domain::{
    Currency, InMemoryOrderRepository, InMemoryProductRepository, MoneyError, NotificationService,
    OrderService, ProductService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            get(routes::orders::list).post(routes::orders::create),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get)
                .put(routes::orders::update)
                .delete(routes::orders::delete),
        )
        .route("/orders/{id}/items", post(routes::orders::add_item))
        .route(
            "/orders/{id}/items/{item_id}",
            axum::routing::patch(routes::orders::update_item)
                .delete(routes::orders::remove_item),
        )
        .route("/orders/{id}/recalculate", post(routes::orders::recalculate))
        .route("/orders/{id}/confirm", post(routes::orders::confirm))
        .route(
            "/orders/{id}/payment",
            post(routes::orders::mark_payment_received),
        )
        .route(
            "/orders/{id}/production",
            post(routes::orders::start_production),
        )
        .route("/orders/{id}/delivery", post(routes::orders::start_delivery))
        .route("/orders/{id}/billing", post(routes::orders::complete_billing))
        .route("/orders/{id}/cancel", post(routes::orders::cancel))
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/products/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .route(
            "/notifications/events",
            get(routes::notifications::events),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with in-memory repositories.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState>, MoneyError> {
    create_state(config, Arc::new(RandomIdGenerator::new()))
}

/// Creates the application state with the given id generator.
pub fn create_state(
    config: &Config,
    ids: Arc<dyn IdGenerator>,
) -> Result<Arc<AppState>, MoneyError> {
    let default_currency = Currency::new(&config.default_currency)?;

    Ok(Arc::new(AppState {
        orders: OrderService::new(InMemoryOrderRepository::new(), Arc::clone(&ids)),
        products: ProductService::new(InMemoryProductRepository::new(), ids),
        notifications: NotificationService::with_buffer(config.notification_buffer),
        default_currency,
        sse_keep_alive: config.sse_keep_alive(),
    }))
}
