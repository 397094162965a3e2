//! Payment amount
//!
//! Domain primitive for the amount paid for an event registration.
//! Amounts are validated at construction time, so an invalid value
//! cannot reach the store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest amount a sale may record, in cents (fits NUMERIC(12, 2))
const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;

/// Maximum decimal places (cents)
const MAX_SCALE: u32 = 2;

/// A validated, strictly positive payment amount.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - At most 2 decimal places
/// - At most 9 999 999 999.99
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use event_registration::domain::PaymentAmount;
///
/// let amount = PaymentAmount::new(Decimal::new(2500, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(2500, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct PaymentAmount(Decimal);

/// Errors that can occur when creating a PaymentAmount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value (9999999999.99)")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl PaymentAmount {
    /// Create a new PaymentAmount with validation.
    ///
    /// Trailing zeros are ignored when counting decimal places, so
    /// `10.500` is accepted as `10.50`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > Decimal::new(MAX_AMOUNT_CENTS, MAX_SCALE) {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for PaymentAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s.trim()).map_err(|e| AmountError::ParseError(e.to_string()))?;
        PaymentAmount::new(decimal)
    }
}

impl TryFrom<Decimal> for PaymentAmount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        PaymentAmount::new(value)
    }
}

impl From<PaymentAmount> for Decimal {
    fn from(amount: PaymentAmount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_amount() {
        let amount = PaymentAmount::new(dec!(150.00)).unwrap();
        assert_eq!(amount.value(), dec!(150));
        assert_eq!(amount.to_string(), "150.00");
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(
            PaymentAmount::new(Decimal::ZERO),
            Err(AmountError::NotPositive(Decimal::ZERO))
        );
        assert!(matches!(
            PaymentAmount::new(dec!(-5)),
            Err(AmountError::NotPositive(_))
        ));
    }

    #[test]
    fn test_too_many_decimals() {
        assert_eq!(
            PaymentAmount::new(dec!(10.005)),
            Err(AmountError::TooManyDecimals(3))
        );
        // Trailing zeros do not count
        assert!(PaymentAmount::new(dec!(10.500)).is_ok());
    }

    #[test]
    fn test_max_amount() {
        assert!(PaymentAmount::new(dec!(9999999999.99)).is_ok());
        assert_eq!(
            PaymentAmount::new(dec!(10000000000)),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_parse() {
        let amount: PaymentAmount = " 25.5 ".parse().unwrap();
        assert_eq!(amount.value(), dec!(25.5));
        assert!(matches!(
            "abc".parse::<PaymentAmount>(),
            Err(AmountError::ParseError(_))
        ));
    }
}
