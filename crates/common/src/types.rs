use serde::{Deserialize, Serialize};

/// Version number of a persisted entity, used for optimistic concurrency control.
///
/// A freshly constructed entity is at version 0. Every successful save
/// increments the version by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for an entity that was never saved.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) assigned by the first save.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the version following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
