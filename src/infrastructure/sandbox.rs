use crate::domain::failure::{ErrorEntry, ErrorSet, ReasonCode};
use crate::domain::money::MoneyAmount;
use crate::domain::ports::{
    Endpoint, SharedCipher, Transport, TransportError, WireRequest, WireResponse,
};
use crate::domain::quote::{Proposal, Proposals, QuoteDirection, QuotesRequest, QuotesResponse};
use crate::domain::remittance::{RemittanceRequest, RemittanceResponse};
use crate::interfaces::xml::codec::{ERRORS_ROOT, PAYMENT_RESPONSE_ROOT, QUOTE_RESPONSE_ROOT};
use crate::interfaces::xml::{from_xml, to_xml};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct Rejection {
    status: u16,
    errors: Vec<ErrorEntry>,
}

impl Rejection {
    fn new(status: u16, source: &str, reason_code: ReasonCode, description: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![ErrorEntry::new(source, reason_code, description)],
        }
    }

    fn invalid(source: &str, description: impl Into<String>) -> Self {
        Self::new(400, source, ReasonCode::InvalidInputValue, description)
    }
}

type Outcome = Result<Vec<u8>, Rejection>;

/// An in-process stand-in for the remittance service.
///
/// Prices quotes from a fixed rate table, issues single-use proposals with an
/// expiry, rejects duplicate transaction references and answers in the same
/// XML shapes as the real service. When a cipher is attached, requests flagged
/// `x-encrypted` are opened with it and their successful replies sealed.
///
/// Clones share state, so a test can keep a handle to inspect what was issued.
#[derive(Clone)]
pub struct SandboxTransport {
    partner_id: String,
    rates: Arc<HashMap<(String, String), Decimal>>,
    proposal_ttl: Duration,
    cipher: Option<SharedCipher>,
    proposals: Arc<RwLock<HashMap<String, Proposal>>>,
    remittances: Arc<RwLock<HashMap<String, RemittanceResponse>>>,
}

impl SandboxTransport {
    pub fn new(partner_id: impl Into<String>) -> Self {
        let rates = HashMap::from([
            (("USD".to_string(), "KES".to_string()), dec!(129.50)),
            (("USD".to_string(), "EUR".to_string()), dec!(0.92)),
            (("USD".to_string(), "INR".to_string()), dec!(83.10)),
            (("GBP".to_string(), "EUR".to_string()), dec!(1.17)),
        ]);
        Self {
            partner_id: partner_id.into(),
            rates: Arc::new(rates),
            proposal_ttl: Duration::minutes(15),
            cipher: None,
            proposals: Arc::default(),
            remittances: Arc::default(),
        }
    }

    /// Adds or replaces a rate. Must be called before the sandbox is cloned.
    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        Arc::make_mut(&mut self.rates).insert((from.to_string(), to.to_string()), rate);
        self
    }

    pub fn with_proposal_ttl(mut self, ttl: Duration) -> Self {
        self.proposal_ttl = ttl;
        self
    }

    pub fn with_cipher(mut self, cipher: SharedCipher) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Proposals issued and not yet consumed.
    pub async fn open_proposals(&self) -> usize {
        self.proposals.read().await.len()
    }

    pub async fn remittance(&self, transaction_reference: &str) -> Option<RemittanceResponse> {
        self.remittances
            .read()
            .await
            .get(transaction_reference)
            .cloned()
    }

    fn rate(&self, from: &str, to: &str, source: &str) -> Result<Decimal, Rejection> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| Rejection::invalid(source, format!("No rate for {from} to {to}")))
    }

    /// Returns `(charged, credited, rate)` for a fixed side and direction.
    fn price(
        &self,
        fixed: &MoneyAmount,
        direction: &QuoteDirection,
        amount_source: &str,
        currency_source: &str,
    ) -> Result<(MoneyAmount, MoneyAmount, Decimal), Rejection> {
        if fixed.amount <= Decimal::ZERO {
            return Err(Rejection::invalid(amount_source, "Amount must be positive"));
        }
        match direction {
            QuoteDirection::Forward { receiver_currency } => {
                let rate = self.rate(&fixed.currency, receiver_currency, currency_source)?;
                let credited = fixed
                    .amount
                    .checked_mul(rate)
                    .map(|amount| MoneyAmount::new(amount.round_dp(2), receiver_currency.clone()))
                    .ok_or_else(|| Rejection::invalid(amount_source, "Amount out of range"))?;
                Ok((fixed.clone(), credited, rate))
            }
            QuoteDirection::Reverse { sender_currency } => {
                let rate = self.rate(sender_currency, &fixed.currency, currency_source)?;
                let charged = fixed
                    .amount
                    .checked_div(rate)
                    .map(|amount| MoneyAmount::new(amount.round_dp(2), sender_currency.clone()))
                    .ok_or_else(|| Rejection::invalid(currency_source, "Unusable rate"))?;
                Ok((charged, fixed.clone(), rate))
            }
        }
    }

    async fn quote(&self, body: &[u8]) -> Outcome {
        let request: QuotesRequest = from_xml(body).map_err(|e| {
            Rejection::new(400, "quoterequest", ReasonCode::InvalidInputFormat, e.to_string())
        })?;
        let direction = request.direction().ok_or_else(|| {
            Rejection::new(
                400,
                "quote_type",
                ReasonCode::MissingRequiredInput,
                "Exactly one of forward or reverse is required",
            )
        })?;
        let (charged, credited, rate) = self.price(
            &request.payment_amount,
            &direction,
            "payment_amount.amount",
            "quote_type",
        )?;

        let proposal = Proposal {
            proposal_id: format!("pen_{}", Uuid::new_v4().simple()),
            fees_included: false,
            charged_amount: charged,
            credited_amount: credited,
            rate,
            expiration_date: Utc::now() + self.proposal_ttl,
        };
        self.proposals
            .write()
            .await
            .insert(proposal.proposal_id.clone(), proposal.clone());

        let response = QuotesResponse {
            transaction_reference: request.transaction_reference,
            proposals: Proposals {
                proposal: vec![proposal],
            },
        };
        render(QUOTE_RESPONSE_ROOT, &response)
    }

    async fn pay(&self, body: &[u8]) -> Outcome {
        let request: RemittanceRequest = from_xml(body).map_err(|e| {
            Rejection::new(400, "paymentrequest", ReasonCode::InvalidInputFormat, e.to_string())
        })?;

        let mut remittances = self.remittances.write().await;
        if remittances.contains_key(&request.transaction_reference) {
            return Err(Rejection::new(
                400,
                "transaction_reference",
                ReasonCode::DuplicateValue,
                "Transaction reference already used",
            ));
        }

        let (charged, credited, rate) = match (
            &request.proposal_id,
            &request.payment_amount,
            &request.receiving_amount,
        ) {
            (Some(proposal_id), None, None) => {
                let proposal = self
                    .proposals
                    .write()
                    .await
                    .remove(proposal_id)
                    .ok_or_else(|| Rejection::invalid("proposal_id", "Invalid proposal id"))?;
                if Utc::now() >= proposal.expiration_date {
                    return Err(Rejection::new(
                        400,
                        "proposal_id",
                        ReasonCode::ProposalExpired,
                        "Proposal has expired",
                    ));
                }
                (proposal.charged_amount, proposal.credited_amount, proposal.rate)
            }
            (None, Some(amount), None) => {
                let receiver_currency = request.receiver_currency.clone().ok_or_else(|| {
                    Rejection::new(
                        400,
                        "receiver_currency",
                        ReasonCode::MissingRequiredInput,
                        "Receiver currency is required",
                    )
                })?;
                self.price(
                    amount,
                    &QuoteDirection::Forward { receiver_currency },
                    "payment_amount.amount",
                    "receiver_currency",
                )?
            }
            (None, None, Some(amount)) => {
                let sender_currency = request.sender_currency.clone().ok_or_else(|| {
                    Rejection::new(
                        400,
                        "sender_currency",
                        ReasonCode::MissingRequiredInput,
                        "Sender currency is required",
                    )
                })?;
                self.price(
                    amount,
                    &QuoteDirection::Reverse { sender_currency },
                    "receiving_amount.amount",
                    "sender_currency",
                )?
            }
            _ => {
                return Err(Rejection::invalid(
                    "proposal_id",
                    "Provide either a proposal id or exactly one amount",
                ));
            }
        };

        let receipt = RemittanceResponse {
            remittance_id: format!("rem_{}", request.transaction_reference),
            transaction_reference: request.transaction_reference.clone(),
            status: "SUCCESS".to_string(),
            proposal_id: request.proposal_id.clone(),
            fx_rate: Some(rate),
            charged_amount: Some(charged),
            credited_amount: credited,
        };
        remittances.insert(request.transaction_reference, receipt.clone());

        render(PAYMENT_RESPONSE_ROOT, &receipt)
    }
}

fn render<T: serde::Serialize>(root: &str, value: &T) -> Outcome {
    to_xml(root, value).map_err(|e| {
        Rejection::new(500, "response", ReasonCode::UnknownError, e.to_string())
    })
}

fn rejection_body(rejection: &Rejection) -> Result<Vec<u8>, TransportError> {
    to_xml(ERRORS_ROOT, &ErrorSet::new(rejection.errors.clone()))
        .map_err(|e| TransportError::Request(e.to_string()))
}

#[async_trait]
impl Transport for SandboxTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        if request.params.partner_id() != Some(self.partner_id.as_str()) {
            let rejection = Rejection::new(
                403,
                "partner-id",
                ReasonCode::InvalidInputValue,
                "Partner is not entitled to this service",
            );
            return Ok(WireResponse::new(rejection.status, rejection_body(&rejection)?));
        }

        let sealed = request.headers.is_encrypted();
        let cipher = match (sealed, &self.cipher) {
            (false, _) => None,
            (true, Some(cipher)) => Some(cipher),
            (true, None) => {
                let rejection = Rejection::new(
                    400,
                    "x-encrypted",
                    ReasonCode::Decline,
                    "Encrypted payloads are not enabled for this partner",
                );
                return Ok(WireResponse::new(rejection.status, rejection_body(&rejection)?));
            }
        };

        let body = match cipher {
            Some(cipher) => match cipher.decrypt(&request.body) {
                Ok(body) => body,
                Err(e) => {
                    let rejection = Rejection::invalid("encrypted_payload", e.to_string());
                    return Ok(WireResponse::new(rejection.status, rejection_body(&rejection)?));
                }
            },
            None => request.body,
        };

        let outcome = match request.endpoint {
            Endpoint::Quotes => self.quote(&body).await,
            Endpoint::Payment => self.pay(&body).await,
        };

        match outcome {
            Ok(reply) => {
                let reply = match cipher {
                    Some(cipher) => cipher
                        .encrypt(&reply)
                        .map_err(|e| TransportError::Request(e.to_string()))?,
                    None => reply,
                };
                Ok(WireResponse::new(200, reply))
            }
            Err(rejection) => Ok(WireResponse::new(rejection.status, rejection_body(&rejection)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{Headers, Method, RequestParams};
    use crate::domain::remittance::Party;
    use crate::interfaces::xml::codec::{PAYMENT_REQUEST_ROOT, QUOTE_REQUEST_ROOT};

    fn wire(endpoint: Endpoint, partner: &str, body: Vec<u8>) -> WireRequest {
        WireRequest {
            method: Method::Post,
            endpoint,
            headers: Headers::xml(),
            params: RequestParams::for_partner(partner),
            body,
        }
    }

    fn forward_quote() -> Vec<u8> {
        let request = QuotesRequest::new(
            "ref-q",
            "tel:+1",
            "tel:+2",
            MoneyAmount::new(dec!(100.00), "USD"),
            QuoteDirection::Forward {
                receiver_currency: "KES".to_string(),
            },
        );
        to_xml(QUOTE_REQUEST_ROOT, &request).unwrap()
    }

    #[tokio::test]
    async fn test_forward_quote_pricing() {
        let sandbox = SandboxTransport::new("ptnr_1");

        let response = sandbox
            .send(wire(Endpoint::Quotes, "ptnr_1", forward_quote()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let quotes: QuotesResponse = from_xml(&response.body).unwrap();
        let proposal = quotes.first_proposal().unwrap();
        assert_eq!(proposal.credited_amount, MoneyAmount::new(dec!(12950.00), "KES"));
        assert_eq!(proposal.charged_amount, MoneyAmount::new(dec!(100.00), "USD"));
        assert_eq!(sandbox.open_proposals().await, 1);
    }

    #[tokio::test]
    async fn test_reverse_quote_pricing() {
        let sandbox = SandboxTransport::new("ptnr_1").with_rate("USD", "KES", dec!(125));
        let request = QuotesRequest::new(
            "ref-q",
            "tel:+1",
            "tel:+2",
            MoneyAmount::new(dec!(1000.00), "KES"),
            QuoteDirection::Reverse {
                sender_currency: "USD".to_string(),
            },
        );

        let response = sandbox
            .send(wire(
                Endpoint::Quotes,
                "ptnr_1",
                to_xml(QUOTE_REQUEST_ROOT, &request).unwrap(),
            ))
            .await
            .unwrap();

        let quotes: QuotesResponse = from_xml(&response.body).unwrap();
        let proposal = quotes.first_proposal().unwrap();
        assert_eq!(proposal.charged_amount, MoneyAmount::new(dec!(8.00), "USD"));
        assert_eq!(proposal.credited_amount, MoneyAmount::new(dec!(1000.00), "KES"));
    }

    #[tokio::test]
    async fn test_unknown_partner_is_rejected() {
        let sandbox = SandboxTransport::new("ptnr_1");

        let response = sandbox
            .send(wire(Endpoint::Quotes, "someone_else", forward_quote()))
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        let errors: ErrorSet = from_xml(&response.body).unwrap();
        assert!(errors.find("partner-id", &ReasonCode::InvalidInputValue).is_some());
    }

    #[tokio::test]
    async fn test_proposal_is_single_use() {
        let sandbox = SandboxTransport::new("ptnr_1");
        let quote = sandbox
            .send(wire(Endpoint::Quotes, "ptnr_1", forward_quote()))
            .await
            .unwrap();
        let quotes: QuotesResponse = from_xml(&quote.body).unwrap();
        let proposal_id = quotes.first_proposal().unwrap().proposal_id.clone();

        let pay = |reference: &str| {
            let request = RemittanceRequest::new(
                reference,
                "tel:+1",
                "tel:+2",
                Party::new("John", "Doe", "USA"),
                Party::new("Jane", "Roe", "KEN"),
            )
            .with_proposal(proposal_id.clone());
            wire(
                Endpoint::Payment,
                "ptnr_1",
                to_xml(PAYMENT_REQUEST_ROOT, &request).unwrap(),
            )
        };

        let first = sandbox.send(pay("ref-1")).await.unwrap();
        let second = sandbox.send(pay("ref-2")).await.unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 400);
        assert_eq!(sandbox.open_proposals().await, 0);
        assert!(sandbox.remittance("ref-1").await.is_some());
    }

    #[tokio::test]
    async fn test_unsupported_pair() {
        let sandbox = SandboxTransport::new("ptnr_1");
        let request = QuotesRequest::new(
            "ref-q",
            "tel:+1",
            "tel:+2",
            MoneyAmount::new(dec!(100.00), "JPY"),
            QuoteDirection::Forward {
                receiver_currency: "KES".to_string(),
            },
        );

        let response = sandbox
            .send(wire(
                Endpoint::Quotes,
                "ptnr_1",
                to_xml(QUOTE_REQUEST_ROOT, &request).unwrap(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        let errors: ErrorSet = from_xml(&response.body).unwrap();
        assert!(errors.find("quote_type", &ReasonCode::InvalidInputValue).is_some());
    }

    #[tokio::test]
    async fn test_forward_payment_amount_out_of_range() {
        let sandbox = SandboxTransport::new("ptnr_1");
        let request = RemittanceRequest::new(
            "ref-max",
            "tel:+1",
            "tel:+2",
            Party::new("John", "Doe", "USA"),
            Party::new("Jane", "Roe", "KEN"),
        )
        .forward(MoneyAmount::new(Decimal::MAX, "USD"), "KES");

        let response = sandbox
            .send(wire(
                Endpoint::Payment,
                "ptnr_1",
                to_xml(PAYMENT_REQUEST_ROOT, &request).unwrap(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        let errors: ErrorSet = from_xml(&response.body).unwrap();
        assert!(
            errors
                .find("payment_amount.amount", &ReasonCode::InvalidInputValue)
                .is_some()
        );
        assert!(sandbox.remittance("ref-max").await.is_none());
    }

    #[tokio::test]
    async fn test_encrypted_request_without_sandbox_cipher() {
        let sandbox = SandboxTransport::new("ptnr_1");
        let mut request = wire(Endpoint::Quotes, "ptnr_1", forward_quote());
        request.headers.insert("x-encrypted", "true");

        let response = sandbox.send(request).await.unwrap();

        assert_eq!(response.status, 400);
        let errors: ErrorSet = from_xml(&response.body).unwrap();
        assert!(errors.find("x-encrypted", &ReasonCode::Decline).is_some());
    }
}
