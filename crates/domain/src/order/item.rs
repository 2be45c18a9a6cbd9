//! Order line items.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::{Money, MoneyError};
use crate::product::ProductId;

use super::OrderItemId;

/// A single line in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    product_id: ProductId,
    quantity: u32,
    price: Money,
}

impl OrderItem {
    /// Creates a new order item. The quantity must be positive.
    pub fn new(
        id: OrderItemId,
        product_id: ProductId,
        quantity: u32,
        price: Money,
    ) -> Result<Self, ValidationError> {
        validate_quantity(quantity)?;
        Ok(Self {
            id,
            product_id,
            quantity,
            price,
        })
    }

    /// Returns the item id.
    pub fn id(&self) -> &OrderItemId {
        &self.id
    }

    /// Returns the product this line refers to.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the ordered quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price.
    pub fn price(&self) -> &Money {
        &self.price
    }

    /// Returns the line total (unit price * quantity).
    pub fn total(&self) -> Result<Money, MoneyError> {
        self.price.multiply(i64::from(self.quantity))
    }

    /// Changes the quantity. The quantity must be positive.
    pub fn update_quantity(&mut self, quantity: u32) -> Result<(), ValidationError> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Changes the unit price.
    pub fn update_price(&mut self, price: Money) {
        self.price = price;
    }
}

fn validate_quantity(quantity: u32) -> Result<(), ValidationError> {
    if quantity == 0 {
        return Err(ValidationError::InvalidQuantity { quantity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, cents: i64) -> Result<OrderItem, ValidationError> {
        OrderItem::new(
            OrderItemId::new("item-1").unwrap(),
            ProductId::new("P1").unwrap(),
            quantity,
            Money::from_cents(cents, "EUR").unwrap(),
        )
    }

    #[test]
    fn test_total_is_price_times_quantity() {
        let item = item(3, 1000).unwrap();
        assert_eq!(item.total().unwrap().cents(), 3000);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            item(0, 1000),
            Err(ValidationError::InvalidQuantity { quantity: 0 })
        );
    }

    #[test]
    fn test_update_quantity() {
        let mut item = item(1, 250).unwrap();
        item.update_quantity(4).unwrap();
        assert_eq!(item.quantity(), 4);
        assert_eq!(item.total().unwrap().cents(), 1000);
    }

    #[test]
    fn test_update_quantity_to_zero_keeps_old_value() {
        let mut item = item(2, 250).unwrap();
        assert!(item.update_quantity(0).is_err());
        assert_eq!(item.quantity(), 2);
    }

    #[test]
    fn test_update_price() {
        let mut item = item(2, 250).unwrap();
        item.update_price(Money::from_cents(100, "EUR").unwrap());
        assert_eq!(item.total().unwrap().cents(), 200);
    }

    #[test]
    fn test_serialization() {
        let item = item(2, 999).unwrap();
        let json = serde_json::to_string(&item).unwrap();
        let back: OrderItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
