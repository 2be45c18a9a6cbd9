//! Persistence boundary for orders and products.

mod memory;

pub use memory::{InMemoryOrderRepository, InMemoryProductRepository};

use async_trait::async_trait;
use common::Version;
use thiserror::Error;

use crate::order::{Order, OrderId};
use crate::product::{Product, ProductId};

/// Errors that can occur when persisting entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The entity was changed by someone else since it was loaded.
    #[error(
        "Concurrency conflict for {entity} {id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        entity: &'static str,
        id: String,
        expected: Version,
        actual: Version,
    },

    /// A new entity was saved under an id that is already taken.
    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: String },
}

/// One page of a listing, with the total number of matching entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    /// Cuts `limit` entries starting at `offset` out of `all`.
    pub fn slice(all: Vec<T>, limit: usize, offset: usize) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self { items, total }
    }
}

/// Storage for order aggregates.
///
/// `save` performs an optimistic concurrency check: the order's version must
/// match the stored version (0 for a new order). A new order whose id is
/// already taken fails with `AlreadyExists`. The returned order carries the
/// incremented version.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Finds an order by id.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Returns all orders, oldest first.
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Returns a page of orders, oldest first.
    async fn find_with_pagination(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Order>, RepositoryError>;

    /// Returns a page of orders whose id, customer name, tax number or email
    /// contains `query` (case-insensitive).
    async fn search_with_pagination(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Order>, RepositoryError>;

    /// Creates or updates an order.
    async fn save(&self, order: Order) -> Result<Order, RepositoryError>;

    /// Deletes an order. Returns false if it did not exist.
    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError>;
}

/// Storage for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Finds a product by id.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Returns all products ordered by name.
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Returns a page of products ordered by name.
    async fn find_with_pagination(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Product>, RepositoryError>;

    /// Returns a page of products whose name contains `query` (case-insensitive).
    async fn search_by_name_with_pagination(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Product>, RepositoryError>;

    /// Creates or updates a product.
    async fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    /// Deletes a product. Returns false if it did not exist.
    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
}
