//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{IdGenerator, Version};
use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money};
use crate::product::ProductId;

use super::{CustomerInfo, OrderAction, OrderError, OrderId, OrderItem, OrderItemId, OrderStatus};

/// Order aggregate root.
///
/// All changes to the order's line items go through this type so that
/// `total_amount` always equals the sum of the item totals. Orders are
/// single-currency: every item price must be in the order's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// Customer who placed the order.
    customer_info: CustomerInfo,

    /// Current status of the order.
    status: OrderStatus,

    /// Currency all items and the total are expressed in.
    currency: Currency,

    /// Line items in insertion order.
    items: Vec<OrderItem>,

    /// Sum of all item totals.
    total_amount: Money,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Construction and query methods
impl Order {
    /// Creates a new order in `Created` status, priced in euros.
    pub fn new(id: OrderId, customer_info: CustomerInfo) -> Self {
        Self::with_currency(id, customer_info, Currency::default())
    }

    /// Creates a new order in `Created` status with the given currency.
    pub fn with_currency(id: OrderId, customer_info: CustomerInfo, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id,
            version: Version::initial(),
            customer_info,
            status: OrderStatus::Created,
            total_amount: Money::zero(currency.clone()),
            currency,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the order id.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the persisted version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version. Called by repositories after a successful save.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns the customer info.
    pub fn customer_info(&self) -> &CustomerInfo {
        &self.customer_info
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the order currency.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns all items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns an item by id.
    pub fn get_item(&self, item_id: &OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Returns the total amount.
    pub fn total_amount(&self) -> &Money {
        &self.total_amount
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the order was last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Status transitions
impl Order {
    /// Confirms a newly created order.
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        self.transition(OrderAction::Confirm)
    }

    /// Records the advance payment for a confirmed order.
    pub fn mark_payment_received(&mut self) -> Result<(), OrderError> {
        self.transition(OrderAction::MarkPaymentReceived)
    }

    /// Starts production once the advance payment is in.
    pub fn start_production(&mut self) -> Result<(), OrderError> {
        self.transition(OrderAction::StartProduction)
    }

    /// Starts delivery once production and packaging are done.
    pub fn start_delivery(&mut self) -> Result<(), OrderError> {
        self.transition(OrderAction::StartDelivery)
    }

    /// Completes billing for a delivered order.
    pub fn complete_billing(&mut self) -> Result<(), OrderError> {
        self.transition(OrderAction::CompleteBilling)
    }

    /// Cancels the order. Not possible once delivery has started.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition(OrderAction::Cancel)
    }

    /// Performs the given transition.
    pub fn apply(&mut self, action: OrderAction) -> Result<(), OrderError> {
        self.transition(action)
    }

    fn transition(&mut self, action: OrderAction) -> Result<(), OrderError> {
        if action == OrderAction::Cancel && self.status == OrderStatus::Canceled {
            return Err(OrderError::AlreadyCanceled);
        }
        if !self.status.allows(action) {
            return Err(OrderError::InvalidTransition {
                current_status: self.status,
                action,
            });
        }

        self.status = action.target();
        self.touch();
        Ok(())
    }
}

// Item management
impl Order {
    /// Adds a new line item and returns its generated id.
    ///
    /// The price must be in the order currency.
    pub fn add_item(
        &mut self,
        ids: &dyn IdGenerator,
        product_id: ProductId,
        quantity: u32,
        price: Money,
    ) -> Result<OrderItemId, OrderError> {
        self.ensure_currency(&price)?;
        let item_id = OrderItemId::new(ids.id())?;
        let item = OrderItem::new(item_id.clone(), product_id, quantity, price)?;

        let mut items = self.items.clone();
        items.push(item);
        self.commit_items(items)?;
        Ok(item_id)
    }

    /// Removes the item with the given id.
    ///
    /// Returns `false` without touching the order if no such item exists.
    pub fn remove_item(&mut self, item_id: &OrderItemId) -> Result<bool, OrderError> {
        let Some(position) = self.items.iter().position(|item| item.id() == item_id) else {
            return Ok(false);
        };

        let mut items = self.items.clone();
        items.remove(position);
        self.commit_items(items)?;
        Ok(true)
    }

    /// Changes the quantity of an item. Returns `false` if no such item exists.
    pub fn update_item_quantity(
        &mut self,
        item_id: &OrderItemId,
        quantity: u32,
    ) -> Result<bool, OrderError> {
        self.update_item(item_id, Some(quantity), None)
    }

    /// Changes the unit price of an item. Returns `false` if no such item exists.
    pub fn update_item_price(
        &mut self,
        item_id: &OrderItemId,
        price: Money,
    ) -> Result<bool, OrderError> {
        self.update_item(item_id, None, Some(price))
    }

    /// Changes the quantity and/or unit price of an item in one step.
    ///
    /// Either both changes are applied or neither is. Returns `false` if no
    /// such item exists.
    pub fn update_item(
        &mut self,
        item_id: &OrderItemId,
        quantity: Option<u32>,
        price: Option<Money>,
    ) -> Result<bool, OrderError> {
        if let Some(price) = &price {
            self.ensure_currency(price)?;
        }
        let mut items = self.items.clone();
        let Some(item) = items.iter_mut().find(|item| item.id() == item_id) else {
            return Ok(false);
        };
        if let Some(quantity) = quantity {
            item.update_quantity(quantity)?;
        }
        if let Some(price) = price {
            item.update_price(price);
        }
        self.commit_items(items)?;
        Ok(true)
    }

    /// Recomputes `total_amount` from the current items.
    pub fn recalculate_total(&mut self) -> Result<&Money, OrderError> {
        self.total_amount = Self::sum_totals(&self.items, &self.currency)?;
        Ok(&self.total_amount)
    }

    /// Replaces the customer info.
    pub fn update_customer_info(&mut self, customer_info: CustomerInfo) {
        self.customer_info = customer_info;
        self.touch();
    }

    fn ensure_currency(&self, price: &Money) -> Result<(), OrderError> {
        if price.currency() != &self.currency {
            return Err(OrderError::CurrencyMismatch {
                expected: self.currency.clone(),
                actual: price.currency().clone(),
            });
        }
        Ok(())
    }

    // Totals are computed before anything is assigned, so a failure leaves
    // the order untouched.
    fn commit_items(&mut self, items: Vec<OrderItem>) -> Result<(), OrderError> {
        let total = Self::sum_totals(&items, &self.currency)?;
        self.items = items;
        self.total_amount = total;
        self.touch();
        Ok(())
    }

    fn sum_totals(items: &[OrderItem], currency: &Currency) -> Result<Money, OrderError> {
        items
            .iter()
            .try_fold(
                Money::zero(currency.clone()),
                |acc, item| -> Result<Money, OrderError> { Ok(acc.add(&item.total()?)?) },
            )
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}
