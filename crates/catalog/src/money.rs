//! Monetary amounts for variant prices.

use serde::{Deserialize, Serialize};

use skuforge_core::{DomainError, DomainResult, ValueObject};

/// Price in the smallest currency unit (e.g. cents) plus an ISO-4217 code.
///
/// Non-negative by construction; formatting is left to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    amount_minor: u64,
    currency: String,
}

#[derive(Deserialize)]
struct RawMoney {
    amount_minor: u64,
    currency: String,
}

impl Money {
    pub fn new(amount_minor: u64, currency: &str) -> DomainResult<Self> {
        let currency = currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "currency must be a 3-letter ISO code, got '{currency}'"
            )));
        }
        Ok(Self {
            amount_minor,
            currency,
        })
    }

    pub fn amount_minor(&self) -> u64 {
        self.amount_minor
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl ValueObject for Money {}

impl TryFrom<RawMoney> for Money {
    type Error = DomainError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.amount_minor, &raw.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_is_normalized() {
        let m = Money::new(1999, " eur ").unwrap();
        assert_eq!(m.currency(), "EUR");
        assert_eq!(m.amount_minor(), 1999);
    }

    #[test]
    fn malformed_currency_is_rejected() {
        assert!(Money::new(1, "EURO").is_err());
        assert!(Money::new(1, "U$D").is_err());
        assert!(Money::new(1, "").is_err());
    }

    #[test]
    fn deserializing_validates() {
        let ok: Money = serde_json::from_value(json!({"amount_minor": 500, "currency": "cop"})).unwrap();
        assert_eq!(ok, Money::new(500, "COP").unwrap());
        assert!(serde_json::from_value::<Money>(json!({"amount_minor": 5, "currency": "x"})).is_err());
        assert!(serde_json::from_value::<Money>(json!({"amount_minor": -5, "currency": "USD"})).is_err());
    }
}
