use super::money::MoneyAmount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the transfer is fixed by the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteDirection {
    /// Source amount is fixed; the service works out what the recipient gets.
    Forward { receiver_currency: String },
    /// Destination amount is fixed; the service works out what the sender pays.
    Reverse { sender_currency: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardQuote {
    pub receiver_currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseQuote {
    pub sender_currency: String,
}

/// Wire shape of the direction selector: exactly one child element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<ForwardQuote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<ReverseQuote>,
}

impl From<QuoteDirection> for QuoteType {
    fn from(direction: QuoteDirection) -> Self {
        match direction {
            QuoteDirection::Forward { receiver_currency } => Self {
                forward: Some(ForwardQuote { receiver_currency }),
                reverse: None,
            },
            QuoteDirection::Reverse { sender_currency } => Self {
                forward: None,
                reverse: Some(ReverseQuote { sender_currency }),
            },
        }
    }
}

impl QuoteType {
    pub fn direction(&self) -> Option<QuoteDirection> {
        match (&self.forward, &self.reverse) {
            (Some(forward), None) => Some(QuoteDirection::Forward {
                receiver_currency: forward.receiver_currency.clone(),
            }),
            (None, Some(reverse)) => Some(QuoteDirection::Reverse {
                sender_currency: reverse.sender_currency.clone(),
            }),
            _ => None,
        }
    }
}

/// Request for one or more exchange-rate proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotesRequest {
    pub transaction_reference: String,
    pub sender_account_uri: String,
    pub recipient_account_uri: String,
    /// The fixed side: sender funds for a forward quote, recipient funds for a reverse one.
    pub payment_amount: MoneyAmount,
    pub payment_origination_country: String,
    pub payment_type: String,
    pub quote_type: QuoteType,
}

impl QuotesRequest {
    pub fn new(
        transaction_reference: impl Into<String>,
        sender_account_uri: impl Into<String>,
        recipient_account_uri: impl Into<String>,
        payment_amount: MoneyAmount,
        direction: QuoteDirection,
    ) -> Self {
        Self {
            transaction_reference: transaction_reference.into(),
            sender_account_uri: sender_account_uri.into(),
            recipient_account_uri: recipient_account_uri.into(),
            payment_amount,
            payment_origination_country: "USA".to_string(),
            payment_type: "P2P".to_string(),
            quote_type: direction.into(),
        }
    }

    pub fn direction(&self) -> Option<QuoteDirection> {
        self.quote_type.direction()
    }
}

/// A time-bound exchange-rate offer. Expiry is enforced by the service only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(rename = "id")]
    pub proposal_id: String,
    #[serde(default)]
    pub fees_included: bool,
    pub charged_amount: MoneyAmount,
    pub credited_amount: MoneyAmount,
    #[serde(rename = "quote_fx_rate")]
    pub rate: Decimal,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposals {
    #[serde(rename = "proposal", default)]
    pub proposal: Vec<Proposal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotesResponse {
    #[serde(default)]
    pub transaction_reference: String,
    #[serde(default)]
    pub proposals: Proposals,
}

impl QuotesResponse {
    /// Proposals in the order the service ranked them.
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals.proposal
    }

    /// The conventional pick when the service offers alternates.
    pub fn first_proposal(&self) -> Option<&Proposal> {
        self.proposals.proposal.first()
    }
}
