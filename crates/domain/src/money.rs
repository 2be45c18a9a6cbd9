//! Currency-tagged monetary amounts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by money construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Amount is NaN, infinite or negative.
    #[error("Amount must be a non-negative number")]
    InvalidAmount,

    /// Currency code is empty.
    #[error("Currency cannot be empty")]
    InvalidCurrency,

    /// Arithmetic between two different currencies.
    #[error("Cannot combine money in {left} with money in {right}")]
    IncompatibleCurrency { left: Currency, right: Currency },

    /// Subtraction would produce a negative amount.
    #[error("Result cannot be negative")]
    NegativeResult,

    /// Multiplication by a negative scalar.
    #[error("Multiplier cannot be negative: {0}")]
    InvalidMultiplier(i64),

    /// Result does not fit in the amount representation.
    #[error("Amount overflow")]
    Overflow,
}

/// Currency code, e.g. `EUR`.
///
/// Codes are trimmed and upper-cased so `"eur"` and `"EUR"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Creates a validated currency code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, MoneyError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(MoneyError::InvalidCurrency);
        }
        Ok(Self(code.to_uppercase()))
    }

    /// Euro, the default currency.
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    /// Returns the currency code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::eur()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Immutable non-negative amount of money in a given currency.
///
/// The amount is held in minor units (cents) to keep arithmetic exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    cents: i64,
    currency: Currency,
}

#[derive(Deserialize)]
struct RawMoney {
    cents: i64,
    currency: Currency,
}

impl TryFrom<RawMoney> for Money {
    type Error = MoneyError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.cents, raw.currency)
    }
}

impl Money {
    /// Creates money from an amount in cents.
    pub fn new(cents: i64, currency: Currency) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::InvalidAmount);
        }
        Ok(Self { cents, currency })
    }

    /// Creates money from cents with a currency code.
    pub fn from_cents(cents: i64, currency: impl AsRef<str>) -> Result<Self, MoneyError> {
        Self::new(cents, Currency::new(currency)?)
    }

    /// Creates money from a major-unit amount (e.g. `10.5` euros),
    /// rounded to the nearest cent.
    pub fn from_major(amount: f64, currency: impl AsRef<str>) -> Result<Self, MoneyError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(MoneyError::InvalidAmount);
        }
        let cents = (amount * 100.0).round();
        if cents > i64::MAX as f64 {
            return Err(MoneyError::Overflow);
        }
        Self::from_cents(cents as i64, currency)
    }

    /// Returns zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self { cents: 0, currency }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the currency.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Adds money of the same currency.
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let cents = self
            .cents
            .checked_add(other.cents)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money {
            cents,
            currency: self.currency.clone(),
        })
    }

    /// Subtracts money of the same currency. The result must not be negative.
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        if other.cents > self.cents {
            return Err(MoneyError::NegativeResult);
        }
        Ok(Money {
            cents: self.cents - other.cents,
            currency: self.currency.clone(),
        })
    }

    /// Multiplies by a non-negative scalar.
    pub fn multiply(&self, multiplier: i64) -> Result<Money, MoneyError> {
        if multiplier < 0 {
            return Err(MoneyError::InvalidMultiplier(multiplier));
        }
        let cents = self
            .cents
            .checked_mul(multiplier)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money {
            cents,
            currency: self.currency.clone(),
        })
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::IncompatibleCurrency {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.cents / 100,
            self.cents % 100,
            self.currency
        )
    }
}
