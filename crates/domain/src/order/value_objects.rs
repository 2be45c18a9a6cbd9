//! Value objects for the order domain.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::string_id;

string_id!(
    /// Unique identifier for an order.
    OrderId,
    "Order ID"
);

string_id!(
    /// Unique identifier for a line item within an order.
    OrderItemId,
    "Order item ID"
);

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Customer details attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomerInfo")]
pub struct CustomerInfo {
    name: String,
    tax_number: String,
    email: String,
}

#[derive(Deserialize)]
struct RawCustomerInfo {
    name: String,
    tax_number: String,
    email: String,
}

impl TryFrom<RawCustomerInfo> for CustomerInfo {
    type Error = ValidationError;

    fn try_from(raw: RawCustomerInfo) -> Result<Self, Self::Error> {
        CustomerInfo::new(raw.name, raw.tax_number, raw.email)
    }
}

impl CustomerInfo {
    /// Creates validated customer info.
    pub fn new(
        name: impl Into<String>,
        tax_number: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        let tax_number = tax_number.into().trim().to_string();
        let email = email.into().trim().to_string();

        if name.is_empty() {
            return Err(ValidationError::InvalidName { kind: "Customer" });
        }
        if tax_number.is_empty() {
            return Err(ValidationError::InvalidTaxNumber);
        }
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(ValidationError::InvalidEmail(email));
        }

        Ok(Self {
            name,
            tax_number,
            email,
        })
    }

    /// Returns the customer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tax/VAT number.
    pub fn tax_number(&self) -> &str {
        &self.tax_number
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }
}
