//! Order aggregate and related types.

mod aggregate;
mod item;
mod service;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use item::OrderItem;
pub use service::{NewOrder, NewOrderItem, OrderService};
pub use state::{OrderAction, OrderStatus};
pub use value_objects::{CustomerInfo, OrderId, OrderItemId};

use thiserror::Error;

use crate::error::ValidationError;
use crate::money::{Currency, MoneyError};

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order is not in the status the transition requires.
    #[error("Invalid status transition: cannot {action} from {current_status} status")]
    InvalidTransition {
        current_status: OrderStatus,
        action: OrderAction,
    },

    /// Cancel was requested on an order that is already canceled.
    #[error("Order is already canceled")]
    AlreadyCanceled,

    /// Item price is not in the order currency.
    #[error("Order is priced in {expected}, item is priced in {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    /// An item failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Total computation failed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}
