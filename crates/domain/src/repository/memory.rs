use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::Version;
use tokio::sync::RwLock;

use crate::order::{Order, OrderId};
use crate::product::{Product, ProductId};

use super::{OrderRepository, Page, ProductRepository, RepositoryError};

/// In-memory order repository.
///
/// Orders live for the lifetime of the process. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns true if no orders are stored.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    async fn sorted(&self, filter: impl Fn(&Order) -> bool) -> Vec<Order> {
        let store = self.orders.read().await;
        let mut orders: Vec<_> = store.values().filter(|o| filter(o)).cloned().collect();
        orders.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        orders
    }
}

fn order_matches(order: &Order, needle: &str) -> bool {
    let customer = order.customer_info();
    [
        order.id().as_str(),
        customer.name(),
        customer.tax_number(),
        customer.email(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.sorted(|_| true).await)
    }

    async fn find_with_pagination(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Order>, RepositoryError> {
        Ok(Page::slice(self.sorted(|_| true).await, limit, offset))
    }

    async fn search_with_pagination(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Order>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        let matches = self.sorted(|order| order_matches(order, &needle)).await;
        Ok(Page::slice(matches, limit, offset))
    }

    async fn save(&self, mut order: Order) -> Result<Order, RepositoryError> {
        let mut store = self.orders.write().await;

        let current = store
            .get(order.id())
            .map(Order::version)
            .unwrap_or(Version::initial());
        if order.version() == Version::initial() && current != Version::initial() {
            return Err(RepositoryError::AlreadyExists {
                entity: "order",
                id: order.id().to_string(),
            });
        }
        if order.version() != current {
            return Err(RepositoryError::ConcurrencyConflict {
                entity: "order",
                id: order.id().to_string(),
                expected: order.version(),
                actual: current,
            });
        }

        order.set_version(current.next());
        store.insert(order.id().clone(), order.clone());
        Ok(order)
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError> {
        Ok(self.orders.write().await.remove(id).is_some())
    }
}

/// In-memory product repository.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    async fn sorted(&self, filter: impl Fn(&Product) -> bool) -> Vec<Product> {
        let store = self.products.read().await;
        let mut products: Vec<_> = store.values().filter(|p| filter(p)).cloned().collect();
        products.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        products
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.sorted(|_| true).await)
    }

    async fn find_with_pagination(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Product>, RepositoryError> {
        Ok(Page::slice(self.sorted(|_| true).await, limit, offset))
    }

    async fn search_by_name_with_pagination(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Product>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        let matches = self
            .sorted(|product| product.name().to_lowercase().contains(&needle))
            .await;
        Ok(Page::slice(matches, limit, offset))
    }

    async fn save(&self, mut product: Product) -> Result<Product, RepositoryError> {
        let mut store = self.products.write().await;

        let current = store
            .get(product.id())
            .map(Product::version)
            .unwrap_or(Version::initial());
        if product.version() == Version::initial() && current != Version::initial() {
            return Err(RepositoryError::AlreadyExists {
                entity: "product",
                id: product.id().to_string(),
            });
        }
        if product.version() != current {
            return Err(RepositoryError::ConcurrencyConflict {
                entity: "product",
                id: product.id().to_string(),
                expected: product.version(),
                actual: current,
            });
        }

        product.set_version(current.next());
        store.insert(product.id().clone(), product.clone());
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        Ok(self.products.write().await.remove(id).is_some())
    }
}
