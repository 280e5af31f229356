use super::money::MoneyAmount;
use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sender or recipient details carried with a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country: String,
}

impl Party {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            country: country.into(),
            ..Default::default()
        }
    }
}

/// A payment submission.
///
/// Either bound to a proposal through `proposal_id`, or one-shot with exactly
/// one fixed side: `payment_amount` (forward) or `receiving_amount` (reverse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceRequest {
    pub transaction_reference: String,
    pub sender_account_uri: String,
    pub recipient_account_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<MoneyAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiving_amount: Option<MoneyAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_currency: Option<String>,
    pub payment_origination_country: String,
    pub payment_type: String,
    pub sender: Party,
    pub recipient: Party,
}

impl RemittanceRequest {
    /// A request with no amount or proposal yet; finish it with one of
    /// [`Self::with_proposal`], [`Self::forward`] or [`Self::reverse`].
    pub fn new(
        transaction_reference: impl Into<String>,
        sender_account_uri: impl Into<String>,
        recipient_account_uri: impl Into<String>,
        sender: Party,
        recipient: Party,
    ) -> Self {
        Self {
            transaction_reference: transaction_reference.into(),
            sender_account_uri: sender_account_uri.into(),
            recipient_account_uri: recipient_account_uri.into(),
            proposal_id: None,
            payment_amount: None,
            receiver_currency: None,
            receiving_amount: None,
            sender_currency: None,
            payment_origination_country: "USA".to_string(),
            payment_type: "P2P".to_string(),
            sender,
            recipient,
        }
    }

    pub fn with_proposal(mut self, proposal_id: impl Into<String>) -> Self {
        self.proposal_id = Some(proposal_id.into());
        self
    }

    /// One-shot with the sender amount fixed.
    pub fn forward(mut self, payment_amount: MoneyAmount, receiver_currency: impl Into<String>) -> Self {
        self.payment_amount = Some(payment_amount);
        self.receiver_currency = Some(receiver_currency.into());
        self
    }

    /// One-shot with the recipient amount fixed.
    pub fn reverse(mut self, receiving_amount: MoneyAmount, sender_currency: impl Into<String>) -> Self {
        self.receiving_amount = Some(receiving_amount);
        self.sender_currency = Some(sender_currency.into());
        self
    }

    pub fn is_quote_bound(&self) -> bool {
        self.proposal_id.is_some()
    }

    /// Structural presence check only; the service stays the authority on
    /// values, currencies and proposal validity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (
            &self.proposal_id,
            &self.payment_amount,
            &self.receiving_amount,
        ) {
            (Some(_), None, None) => Ok(()),
            (Some(_), Some(_), _) => Err(ValidationError::ProposalWithAmount("payment_amount")),
            (Some(_), None, Some(_)) => {
                Err(ValidationError::ProposalWithAmount("receiving_amount"))
            }
            (None, Some(_), Some(_)) => Err(ValidationError::AmbiguousDirection),
            (None, None, None) => Err(ValidationError::MissingAmount),
            (None, Some(amount), None) if !amount.is_complete() => {
                Err(ValidationError::IncompleteAmount("payment_amount"))
            }
            (None, None, Some(amount)) if !amount.is_complete() => {
                Err(ValidationError::IncompleteAmount("receiving_amount"))
            }
            (None, _, _) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemittanceStatus {
    Success,
    Pending,
    Rejected,
    Reversed,
    Other(String),
}

impl From<&str> for RemittanceStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => RemittanceStatus::Success,
            "PENDING" => RemittanceStatus::Pending,
            "REJECTED" => RemittanceStatus::Rejected,
            "REVERSED" => RemittanceStatus::Reversed,
            _ => RemittanceStatus::Other(value.to_string()),
        }
    }
}

/// Terminal receipt of an accepted payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceResponse {
    #[serde(rename = "id", default)]
    pub remittance_id: String,
    #[serde(default)]
    pub transaction_reference: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charged_amount: Option<MoneyAmount>,
    pub credited_amount: MoneyAmount,
}

impl RemittanceResponse {
    pub fn remittance_status(&self) -> RemittanceStatus {
        RemittanceStatus::from(self.status.as_str())
    }
}
