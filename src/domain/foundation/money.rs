//! Money value object.
//!
//! Monetary amounts are stored as i64 minor units (halalas, cents), never
//! floats. The currency is a 3-letter ISO 4217 code, uppercased on entry.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A positive monetary amount in minor units with its currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount_minor: i64,
    currency: String,
}

impl Money {
    /// Creates a Money value.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts and currency codes that are not
    /// three ASCII letters.
    pub fn new(amount_minor: i64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        if amount_minor <= 0 {
            return Err(ValidationError::invalid_format(
                "amount",
                "amount must be positive",
            ));
        }

        let currency = currency.into().trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "currency must be a 3-letter ISO code",
            ));
        }

        Ok(Self {
            amount_minor,
            currency,
        })
    }

    /// Returns the amount in minor units.
    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    /// Returns the currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Formats the amount in major units with two decimal places,
    /// the representation hosted payment pages expect.
    pub fn display_amount(&self) -> String {
        format!("{}.{:02}", self.amount_minor / 100, self.amount_minor % 100)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.display_amount(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_amounts() {
        let money = Money::new(10_000, "SAR").unwrap();
        assert_eq!(money.amount_minor(), 10_000);
        assert_eq!(money.currency(), "SAR");
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        assert!(Money::new(0, "SAR").is_err());
        assert!(Money::new(-500, "SAR").is_err());
    }

    #[test]
    fn normalizes_currency_case() {
        let money = Money::new(100, "sar").unwrap();
        assert_eq!(money.currency(), "SAR");
    }

    #[test]
    fn rejects_malformed_currency_codes() {
        assert!(Money::new(100, "SA").is_err());
        assert!(Money::new(100, "RIYAL").is_err());
        assert!(Money::new(100, "S4R").is_err());
    }

    #[test]
    fn display_amount_uses_major_units() {
        assert_eq!(Money::new(10_000, "SAR").unwrap().display_amount(), "100.00");
        assert_eq!(Money::new(10_050, "SAR").unwrap().display_amount(), "100.50");
        assert_eq!(Money::new(5, "SAR").unwrap().display_amount(), "0.05");
    }

    #[test]
    fn display_includes_currency() {
        assert_eq!(Money::new(2_500, "SAR").unwrap().to_string(), "25.00 SAR");
    }
}
