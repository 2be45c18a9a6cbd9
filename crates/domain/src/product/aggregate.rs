use common::Version;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;

use super::ProductId;

/// A sellable product with a list price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    #[serde(default)]
    version: Version,
    name: String,
    price: Money,
}

impl Product {
    /// Creates a product. The name must not be empty.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            version: Version::initial(),
            name: validate_name(name.into())?,
            price,
        })
    }

    /// Returns the product ID.
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Returns the stored version, 0 if never saved.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version. Called by repositories after a successful save.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns the product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the list price.
    pub fn price(&self) -> &Money {
        &self.price
    }

    /// Renames the product. The name must not be empty.
    pub fn update_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = validate_name(name.into())?;
        Ok(())
    }

    /// Replaces the list price. Orders that already hold the product keep
    /// their own item prices.
    pub fn update_price(&mut self, price: Money) {
        self.price = price;
    }
}

fn validate_name(name: String) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName { kind: "Product" });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new(
            ProductId::new("000042").unwrap(),
            "Widget",
            Money::from_cents(1250, "EUR").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_product() {
        let product = widget();
        assert_eq!(product.id().as_str(), "000042");
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.price().cents(), 1250);
        assert_eq!(product.version(), Version::initial());
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Product::new(
            ProductId::new("1").unwrap(),
            "  ",
            Money::from_cents(1, "EUR").unwrap(),
        );
        assert_eq!(result, Err(ValidationError::InvalidName { kind: "Product" }));
    }

    #[test]
    fn test_update_name() {
        let mut product = widget();
        product.update_name("Gadget").unwrap();
        assert_eq!(product.name(), "Gadget");
        assert!(product.update_name("").is_err());
        assert_eq!(product.name(), "Gadget");
    }

    #[test]
    fn test_update_price() {
        let mut product = widget();
        product.update_price(Money::from_cents(999, "EUR").unwrap());
        assert_eq!(product.price().cents(), 999);
    }
}
