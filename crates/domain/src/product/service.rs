//! Product catalog service.

use std::sync::Arc;

use common::IdGenerator;

use crate::error::DomainError;
use crate::money::Money;
use crate::repository::{Page, ProductRepository, RepositoryError};

use super::{Product, ProductId};

/// How many generated ids `create_product` tries before giving up.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Service for managing the product catalog.
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: R,
    ids: Arc<dyn IdGenerator>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Creates a service over the given repository and id source.
    pub fn new(repository: R, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    /// Returns all products ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.repository.find_all().await?)
    }

    /// Returns one page of products ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn products_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Product>, DomainError> {
        Ok(self.repository.find_with_pagination(limit, offset).await?)
    }

    /// Returns one page of products whose name contains `query`.
    #[tracing::instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Product>, DomainError> {
        Ok(self
            .repository
            .search_by_name_with_pagination(query, limit, offset)
            .await?)
    }

    /// Loads a product by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.repository.find_by_id(product_id).await?)
    }

    /// Creates a product with a freshly generated six-digit id.
    ///
    /// A generated id that is already taken is replaced by a new one, up to
    /// `MAX_ID_ATTEMPTS` times.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, name: &str, price: Money) -> Result<Product, DomainError> {
        let mut attempt = 1;
        loop {
            let product_id = ProductId::new(self.ids.product_id())?;
            let product = Product::new(product_id, name, price.clone())?;

            match self.repository.save(product).await {
                Ok(product) => {
                    metrics::counter!("products_created_total").increment(1);
                    tracing::info!(product_id = %product.id(), name = product.name(), "Product created");
                    return Ok(product);
                }
                Err(RepositoryError::AlreadyExists { id, .. }) if attempt < MAX_ID_ATTEMPTS => {
                    tracing::warn!(product_id = %id, attempt, "Product id taken, generating another");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Replaces the name and price of a product.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        name: &str,
        price: Money,
    ) -> Result<Product, DomainError> {
        let mut product = self
            .repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(product_id.clone()))?;

        product.update_name(name)?;
        product.update_price(price);

        Ok(self.repository.save(product).await?)
    }

    /// Deletes a product. Returns false if it did not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<bool, DomainError> {
        let deleted = self.repository.delete(product_id).await?;
        if deleted {
            tracing::info!(product_id = %product_id, "Product deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::repository::InMemoryProductRepository;
    use common::SequentialIdGenerator;

    fn service() -> ProductService<InMemoryProductRepository> {
        ProductService::new(
            InMemoryProductRepository::new(),
            Arc::new(SequentialIdGenerator::new()),
        )
    }

    fn eur(cents: i64) -> Money {
        Money::from_cents(cents, "EUR").unwrap()
    }

    /// Hands out the given product ids in order, repeating the last one.
    struct ScriptedIds(Mutex<Vec<&'static str>>);

    impl ScriptedIds {
        fn new(ids: &[&'static str]) -> Arc<Self> {
            Arc::new(Self(Mutex::new(ids.iter().rev().copied().collect())))
        }
    }

    impl IdGenerator for ScriptedIds {
        fn id(&self) -> String {
            self.product_id()
        }

        fn product_id(&self) -> String {
            let mut ids = self.0.lock().unwrap();
            if ids.len() > 1 {
                ids.pop().unwrap().to_string()
            } else {
                ids[0].to_string()
            }
        }
    }

    #[tokio::test]
    async fn test_create_product() {
        let service = service();
        let product = service.create_product("Widget", eur(1999)).await.unwrap();

        assert_eq!(product.id().as_str(), "000001");
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.price().cents(), 1999);
    }

    #[tokio::test]
    async fn test_create_product_replaces_taken_id() {
        let ids = ScriptedIds::new(&["123456", "123456", "654321"]);
        let service = ProductService::new(InMemoryProductRepository::new(), ids);

        let first = service.create_product("Widget", eur(100)).await.unwrap();
        let second = service.create_product("Gadget", eur(200)).await.unwrap();

        assert_eq!(first.id().as_str(), "123456");
        assert_eq!(second.id().as_str(), "654321");
        assert_eq!(second.name(), "Gadget");
        assert_eq!(service.list_products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_product_gives_up_when_ids_keep_colliding() {
        let ids = ScriptedIds::new(&["123456"]);
        let service = ProductService::new(InMemoryProductRepository::new(), ids);
        service.create_product("Widget", eur(100)).await.unwrap();

        let result = service.create_product("Gadget", eur(200)).await;

        assert!(matches!(
            result,
            Err(DomainError::Repository(RepositoryError::AlreadyExists { .. }))
        ));
        let stored = service.list_products().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name(), "Widget");
    }

    #[tokio::test]
    async fn test_create_product_with_empty_name() {
        let service = service();
        let result = service.create_product("  ", eur(100)).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(service.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_product() {
        let service = service();
        let product = service.create_product("Widget", eur(100)).await.unwrap();

        let updated = service
            .update_product(product.id(), "Gadget", eur(250))
            .await
            .unwrap();
        assert_eq!(updated.name(), "Gadget");
        assert_eq!(updated.price().cents(), 250);
        assert_eq!(updated.version(), product.version().next());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let service = service();
        let id = ProductId::new("999999").unwrap();

        let result = service.update_product(&id, "Gadget", eur(250)).await;
        assert!(matches!(result, Err(DomainError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_search_products() {
        let service = service();
        service.create_product("Blue widget", eur(100)).await.unwrap();
        service.create_product("Red widget", eur(100)).await.unwrap();
        service.create_product("Gadget", eur(100)).await.unwrap();

        let page = service.search_products("WIDGET", 10, 0).await.unwrap();
        assert_eq!(page.total, 2);

        let page = service.products_page(2, 0).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].name(), "Blue widget");
    }

    #[tokio::test]
    async fn test_delete_product() {
        let service = service();
        let product = service.create_product("Widget", eur(100)).await.unwrap();

        assert!(service.delete_product(product.id()).await.unwrap());
        assert!(!service.delete_product(product.id()).await.unwrap());
        assert!(service.get_product(product.id()).await.unwrap().is_none());
    }
}
