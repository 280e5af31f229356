use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount paired with its ISO 4217 currency code.
///
/// Amounts are carried exactly as upstream sends them; the client never
/// rescales or converts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAmount {
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyAmount {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// True when both halves of the pair are usable.
    pub fn is_complete(&self) -> bool {
        !self.currency.trim().is_empty()
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
