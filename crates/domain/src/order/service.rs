//! Order service providing a simplified API for order operations.

use std::sync::Arc;

use common::IdGenerator;

use crate::error::DomainError;
use crate::money::{Currency, Money};
use crate::product::ProductId;
use crate::repository::{OrderRepository, Page};

use super::{CustomerInfo, Order, OrderAction, OrderId, OrderItemId};

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub tax_number: String,
    pub email: String,
    /// Currency of the order. Defaults to EUR.
    pub currency: Option<Currency>,
}

impl NewOrder {
    /// Creates the input for a EUR order.
    pub fn new(
        customer_name: impl Into<String>,
        tax_number: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            tax_number: tax_number.into(),
            email: email.into(),
            currency: None,
        }
    }

    /// Sets the order currency.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
}

/// Input for a line item added at creation time.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

impl NewOrderItem {
    /// Creates an item request.
    pub fn new(product_id: ProductId, quantity: u32, price: Money) -> Self {
        Self {
            product_id,
            quantity,
            price,
        }
    }
}

/// Service for managing orders.
///
/// Every mutation loads the order, applies the change to the aggregate and
/// saves it back. A failed change is never saved.
#[derive(Clone)]
pub struct OrderService<R: OrderRepository> {
    repository: R,
    ids: Arc<dyn IdGenerator>,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service.
    pub fn new(repository: R, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns all orders, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.repository.find_all().await?)
    }

    /// Returns one page of orders.
    #[tracing::instrument(skip(self))]
    pub async fn orders_page(&self, limit: usize, offset: usize) -> Result<Page<Order>, DomainError> {
        Ok(self.repository.find_with_pagination(limit, offset).await?)
    }

    /// Returns one page of orders matching `query`.
    #[tracing::instrument(skip(self))]
    pub async fn search_orders(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Order>, DomainError> {
        Ok(self
            .repository
            .search_with_pagination(query, limit, offset)
            .await?)
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.repository.find_by_id(order_id).await?)
    }

    /// Creates a new empty order.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(&self, input: NewOrder) -> Result<Order, DomainError> {
        self.create_order_with_items(input, Vec::new()).await
    }

    /// Creates an order and adds items in a single save.
    ///
    /// Nothing is stored if any item is rejected.
    #[tracing::instrument(skip(self))]
    pub async fn create_order_with_items(
        &self,
        input: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<Order, DomainError> {
        let customer_info = CustomerInfo::new(input.customer_name, input.tax_number, input.email)?;
        let order_id = OrderId::new(self.ids.id())?;
        let currency = input.currency.unwrap_or_default();

        let mut order = Order::with_currency(order_id, customer_info, currency);
        for item in items {
            order.add_item(self.ids.as_ref(), item.product_id, item.quantity, item.price)?;
        }

        let order = self.repository.save(order).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.id(),
            items = order.item_count(),
            total = %order.total_amount(),
            "Order created"
        );
        Ok(order)
    }

    /// Replaces the customer info of an order.
    #[tracing::instrument(skip(self))]
    pub async fn update_customer(
        &self,
        order_id: &OrderId,
        customer_info: CustomerInfo,
    ) -> Result<Order, DomainError> {
        self.mutate(order_id, |order| {
            order.update_customer_info(customer_info);
            Ok(())
        })
        .await
    }

    /// Applies a status transition to an order.
    #[tracing::instrument(skip(self))]
    pub async fn apply_action(
        &self,
        order_id: &OrderId,
        action: OrderAction,
    ) -> Result<Order, DomainError> {
        let order = self
            .mutate(order_id, |order| Ok(order.apply(action)?))
            .await?;

        metrics::counter!("order_transitions_total", "action" => action.as_str()).increment(1);
        tracing::info!(order_id = %order_id, status = %order.status(), "Order status changed");
        Ok(order)
    }

    /// Adds an item to an order and returns the order with the new item's id.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        order_id: &OrderId,
        item: NewOrderItem,
    ) -> Result<(Order, OrderItemId), DomainError> {
        self.mutate_with(order_id, |order| {
            Ok(order.add_item(
                self.ids.as_ref(),
                item.product_id,
                item.quantity,
                item.price,
            )?)
        })
        .await
    }

    /// Removes an item from an order.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
    ) -> Result<Order, DomainError> {
        self.mutate(order_id, |order| {
            if order.remove_item(item_id)? {
                Ok(())
            } else {
                Err(item_not_found(order_id, item_id))
            }
        })
        .await
    }

    /// Updates the quantity of an item in an order.
    pub async fn update_item_quantity(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
        quantity: u32,
    ) -> Result<Order, DomainError> {
        self.update_item(order_id, item_id, Some(quantity), None).await
    }

    /// Updates the unit price of an item in an order.
    pub async fn update_item_price(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
        price: Money,
    ) -> Result<Order, DomainError> {
        self.update_item(order_id, item_id, None, Some(price)).await
    }

    /// Updates the quantity and/or unit price of an item with a single save.
    #[tracing::instrument(skip(self))]
    pub async fn update_item(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
        quantity: Option<u32>,
        price: Option<Money>,
    ) -> Result<Order, DomainError> {
        self.mutate(order_id, |order| {
            if order.update_item(item_id, quantity, price)? {
                Ok(())
            } else {
                Err(item_not_found(order_id, item_id))
            }
        })
        .await
    }

    /// Recomputes and stores the order total.
    #[tracing::instrument(skip(self))]
    pub async fn recalculate_total(&self, order_id: &OrderId) -> Result<Order, DomainError> {
        self.mutate(order_id, |order| {
            order.recalculate_total()?;
            Ok(())
        })
        .await
    }

    /// Deletes an order. Returns false if it did not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<bool, DomainError> {
        let deleted = self.repository.delete(order_id).await?;
        if deleted {
            tracing::info!(order_id = %order_id, "Order deleted");
        }
        Ok(deleted)
    }

    async fn mutate<F>(&self, order_id: &OrderId, change: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&mut Order) -> Result<(), DomainError>,
    {
        let (order, ()) = self.mutate_with(order_id, change).await?;
        Ok(order)
    }

    async fn mutate_with<F, T>(
        &self,
        order_id: &OrderId,
        change: F,
    ) -> Result<(Order, T), DomainError>
    where
        F: FnOnce(&mut Order) -> Result<T, DomainError>,
    {
        let mut order = self
            .repository
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.clone()))?;

        let output = change(&mut order)?;

        let order = self.repository.save(order).await?;
        tracing::debug!(order_id = %order_id, version = %order.version(), "Order saved");
        Ok((order, output))
    }
}

fn item_not_found(order_id: &OrderId, item_id: &OrderItemId) -> DomainError {
    DomainError::ItemNotFound {
        order_id: order_id.clone(),
        item_id: item_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderError, OrderStatus};
    use crate::repository::{InMemoryOrderRepository, RepositoryError};
    use common::SequentialIdGenerator;

    fn service() -> OrderService<InMemoryOrderRepository> {
        OrderService::new(
            InMemoryOrderRepository::new(),
            Arc::new(SequentialIdGenerator::new()),
        )
    }

    fn acme() -> NewOrder {
        NewOrder::new("Acme", "123456789", "a@acme.com")
    }

    fn eur(cents: i64) -> Money {
        Money::from_cents(cents, "EUR").unwrap()
    }

    fn line(product: &str, quantity: u32, cents: i64) -> NewOrderItem {
        NewOrderItem::new(ProductId::new(product).unwrap(), quantity, eur(cents))
    }

    #[tokio::test]
    async fn test_create_order() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();

        assert_eq!(order.id().as_str(), "ID-0001");
        assert_eq!(order.status(), OrderStatus::Created);
        assert!(order.total_amount().is_zero());
        assert_eq!(order.version(), common::Version::first());
    }

    #[tokio::test]
    async fn test_create_order_rejects_bad_email() {
        let service = service();
        let result = service
            .create_order(NewOrder::new("Acme", "123", "not-an-email"))
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_with_items() {
        let service = service();
        let order = service
            .create_order_with_items(acme(), vec![line("P1", 2, 1000), line("P2", 1, 500)])
            .await
            .unwrap();

        assert_eq!(order.item_count(), 2);
        assert_eq!(order.total_amount().cents(), 2500);
    }

    #[tokio::test]
    async fn test_create_order_with_foreign_currency_item_stores_nothing() {
        let service = service();
        let usd = NewOrderItem::new(
            ProductId::new("P1").unwrap(),
            1,
            Money::from_cents(100, "USD").unwrap(),
        );

        let result = service.create_order_with_items(acme(), vec![usd]).await;

        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::CurrencyMismatch { .. }))
        ));
        assert!(service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_item() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();

        let (order, item_id) = service
            .add_item(order.id(), line("P1", 3, 1000))
            .await
            .unwrap();
        assert_eq!(order.total_amount().cents(), 3000);

        let order = service.remove_item(order.id(), &item_id).await.unwrap();
        assert_eq!(order.item_count(), 0);
        assert!(order.total_amount().is_zero());
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();
        let missing = OrderItemId::new("nope").unwrap();

        let result = service.remove_item(order.id(), &missing).await;
        assert!(matches!(result, Err(DomainError::ItemNotFound { .. })));

        let stored = service.get_order(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.version(), order.version());
    }

    #[tokio::test]
    async fn test_update_item_quantity_and_price() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();
        let (order, item_id) = service
            .add_item(order.id(), line("P1", 2, 1000))
            .await
            .unwrap();

        let order = service
            .update_item_quantity(order.id(), &item_id, 5)
            .await
            .unwrap();
        assert_eq!(order.total_amount().cents(), 5000);

        let order = service
            .update_item_price(order.id(), &item_id, eur(200))
            .await
            .unwrap();
        assert_eq!(order.total_amount().cents(), 1000);

        let result = service.update_item_quantity(order.id(), &item_id, 0).await;
        assert!(matches!(result, Err(DomainError::Order(OrderError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_failed_combined_item_update_saves_nothing() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();
        let (order, item_id) = service
            .add_item(order.id(), line("P1", 2, 1000))
            .await
            .unwrap();

        let usd = Money::from_cents(250, "USD").unwrap();
        let result = service
            .update_item(order.id(), &item_id, Some(5), Some(usd))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::CurrencyMismatch { .. }))
        ));

        let stored = service.get_order(order.id()).await.unwrap().unwrap();
        assert_eq!(stored, order);
        assert_eq!(stored.items()[0].quantity(), 2);

        let updated = service
            .update_item(order.id(), &item_id, Some(5), Some(eur(250)))
            .await
            .unwrap();
        assert_eq!(updated.total_amount().cents(), 1250);
        assert_eq!(updated.version(), order.version().next());
    }

    #[tokio::test]
    async fn test_full_order_lifecycle() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();
        let id = order.id().clone();

        for action in [
            OrderAction::Confirm,
            OrderAction::MarkPaymentReceived,
            OrderAction::StartProduction,
            OrderAction::StartDelivery,
            OrderAction::CompleteBilling,
        ] {
            let order = service.apply_action(&id, action).await.unwrap();
            assert_eq!(order.status(), action.target());
        }

        let result = service.apply_action(&id, OrderAction::Cancel).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_cancel_twice() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();

        service
            .apply_action(order.id(), OrderAction::Cancel)
            .await
            .unwrap();
        let result = service.apply_action(order.id(), OrderAction::Cancel).await;

        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::AlreadyCanceled))
        ));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let service = service();
        let id = OrderId::new("missing").unwrap();

        assert!(service.get_order(&id).await.unwrap().is_none());
        assert!(matches!(
            service.apply_action(&id, OrderAction::Confirm).await,
            Err(DomainError::OrderNotFound(_))
        ));
        assert!(!service.delete_order(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_customer() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();
        let info = CustomerInfo::new("Acme d.o.o.", "987654321", "office@acme.com").unwrap();

        let order = service.update_customer(order.id(), info.clone()).await.unwrap();
        assert_eq!(order.customer_info(), &info);
    }

    #[tokio::test]
    async fn test_recalculate_total_is_idempotent() {
        let service = service();
        let order = service
            .create_order_with_items(acme(), vec![line("P1", 3, 1000)])
            .await
            .unwrap();

        let first = service.recalculate_total(order.id()).await.unwrap();
        let second = service.recalculate_total(order.id()).await.unwrap();
        assert_eq!(first.total_amount(), second.total_amount());
        assert_eq!(second.total_amount().cents(), 3000);
    }

    #[tokio::test]
    async fn test_search_and_pagination() {
        let service = service();
        service.create_order(acme()).await.unwrap();
        service
            .create_order(NewOrder::new("Delta", "555", "d@delta.rs"))
            .await
            .unwrap();

        let page = service.orders_page(1, 0).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);

        let page = service.search_orders("delta", 10, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].customer_info().name(), "Delta");
    }

    #[tokio::test]
    async fn test_stale_copy_cannot_overwrite() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();
        let mut stale = order.clone();

        service
            .apply_action(order.id(), OrderAction::Confirm)
            .await
            .unwrap();
        stale.cancel().unwrap();

        let result = service.repository().save(stale).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_order() {
        let service = service();
        let order = service.create_order(acme()).await.unwrap();

        assert!(service.delete_order(order.id()).await.unwrap());
        assert!(service.get_order(order.id()).await.unwrap().is_none());
    }
}
