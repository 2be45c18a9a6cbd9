//! Domain error types.

use thiserror::Error;

use crate::money::MoneyError;
use crate::order::{OrderError, OrderId, OrderItemId};
use crate::product::ProductId;
use crate::repository::RepositoryError;

/// Errors raised when constructing or updating value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier is empty or whitespace.
    #[error("{kind} cannot be empty")]
    EmptyId { kind: &'static str },

    /// Customer or product name is empty.
    #[error("{kind} name cannot be empty")]
    InvalidName { kind: &'static str },

    /// Customer tax number is empty.
    #[error("Tax number cannot be empty")]
    InvalidTaxNumber,

    /// Email does not look like an address.
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Quantity is not a positive integer.
    #[error("Quantity must be a positive integer, got {quantity}")]
    InvalidQuantity { quantity: u32 },
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A value object rejected its input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Money construction or arithmetic failed.
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// An error occurred in the order aggregate.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// The repository rejected the operation.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// No order with the given id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No item with the given id in the order.
    #[error("Item {item_id} not found in order {order_id}")]
    ItemNotFound {
        order_id: OrderId,
        item_id: OrderItemId,
    },

    /// No product with the given id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
}
