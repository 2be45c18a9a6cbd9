//! Shared primitives for the order management system.

pub mod ids;
pub mod types;

pub use ids::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use types::Version;
