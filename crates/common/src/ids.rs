//! Identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LENGTH: usize = 10;
const PRODUCT_ID_MODULUS: u128 = 1_000_000;

/// Source of fresh identifiers for entities.
pub trait IdGenerator: Send + Sync {
    /// Returns a new generic entity id.
    fn id(&self) -> String;

    /// Returns a new product id: exactly six ASCII digits.
    fn product_id(&self) -> String;
}

/// Generates ids from random v4 UUIDs.
///
/// Entity ids are 10 alphanumeric characters, product ids are 6 digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    /// Creates a new random id generator.
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn id(&self) -> String {
        let mut value = Uuid::new_v4().as_u128();
        let base = ALPHABET.len() as u128;
        (0..ID_LENGTH)
            .map(|_| {
                let c = ALPHABET[(value % base) as usize] as char;
                value /= base;
                c
            })
            .collect()
    }

    fn product_id(&self) -> String {
        format!("{:06}", Uuid::new_v4().as_u128() % PRODUCT_ID_MODULUS)
    }
}

/// Deterministic generator producing `ID-0001`, `ID-0002`, ... and
/// `000001`, `000002`, ... for product ids.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next_id: AtomicU64,
    next_product_id: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator starting at 1.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("ID-{n:04}")
    }

    fn product_id(&self) -> String {
        let n = self.next_product_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{:06}", n % PRODUCT_ID_MODULUS as u64)
    }
}
