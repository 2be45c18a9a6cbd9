//! HTTP route handlers and shared request plumbing.

pub mod health;
pub mod metrics;
pub mod notifications;
pub mod orders;
pub mod products;

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use domain::{
    Currency, InMemoryOrderRepository, InMemoryProductRepository, Money, NotificationService,
    OrderService, ProductService,
};
use serde::{Deserialize, Serialize};

/// Header carrying the id of the user performing a request.
pub const USER_HEADER: &str = "x-user-id";

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orders: OrderService<InMemoryOrderRepository>,
    pub products: ProductService<InMemoryProductRepository>,
    pub notifications: NotificationService,
    pub default_currency: Currency,
    pub sse_keep_alive: Duration,
}

/// The user on whose behalf a request is made, or empty if anonymous.
#[derive(Debug, Clone, Default)]
pub struct ActingUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();
        Ok(Self(user.to_string()))
    }
}

/// `limit`, `offset` and `q` query parameters of list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub q: Option<String>,
}

impl ListQuery {
    /// Returns the page size, clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns the number of entries to skip.
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Returns the search term, if one was given.
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// One page of a listing.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Money as rendered in responses.
#[derive(Debug, Serialize)]
pub struct MoneyResponse {
    pub cents: i64,
    pub currency: String,
    pub formatted: String,
}

impl From<&Money> for MoneyResponse {
    fn from(money: &Money) -> Self {
        Self {
            cents: money.cents(),
            currency: money.currency().to_string(),
            formatted: money.to_string(),
        }
    }
}

/// Builds a price from a request, defaulting the currency.
pub fn money_from_request(
    cents: i64,
    currency: Option<&str>,
    default: &Currency,
) -> Result<Money, domain::MoneyError> {
    match currency {
        Some(code) => Money::new(cents, Currency::new(code)?),
        None => Money::new(cents, default.clone()),
    }
}
