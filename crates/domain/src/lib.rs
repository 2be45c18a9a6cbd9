//! Domain layer for order management.
//!
//! This crate provides:
//! - Money and validated identifier value objects
//! - The Order aggregate with its status state machine and line items
//! - Products, repositories and their in-memory implementations
//! - Application services for orders and products
//! - The notification hub that fans change events out to live clients

pub mod error;
mod id;
pub mod money;
pub mod notification;
pub mod order;
pub mod product;
pub mod repository;

pub use error::{DomainError, ValidationError};
pub use money::{Currency, Money, MoneyError};
pub use notification::{ClientId, NotificationEvent, NotificationService, Subscription};
pub use order::{
    CustomerInfo, NewOrder, NewOrderItem, Order, OrderAction, OrderError, OrderId, OrderItem,
    OrderItemId, OrderService, OrderStatus,
};
pub use product::{Product, ProductId, ProductService};
pub use repository::{
    InMemoryOrderRepository, InMemoryProductRepository, OrderRepository, Page, ProductRepository,
    RepositoryError,
};
