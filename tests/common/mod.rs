#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use crossborder::application::{QuotesApi, RemittanceApi};
use crossborder::config::ClientConfig;
use crossborder::domain::money::MoneyAmount;
use crossborder::domain::ports::{
    RequestParams, Transport, TransportError, WireRequest, WireResponse,
};
use crossborder::domain::quote::{QuoteDirection, QuotesRequest};
use crossborder::domain::remittance::{Party, RemittanceRequest};
use crossborder::infrastructure::cipher::AesGcmCipher;
use crossborder::infrastructure::sandbox::SandboxTransport;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PARTNER_ID: &str = "ptnr_2445762";
pub const PAYLOAD_KEY: [u8; 32] = [42u8; 32];

pub fn params() -> RequestParams {
    RequestParams::for_partner(PARTNER_ID)
}

pub fn encrypted_config() -> ClientConfig {
    ClientConfig {
        partner_id: PARTNER_ID.to_string(),
        encryption_enabled: false,
        payload_key: Some(BASE64.encode(PAYLOAD_KEY)),
        ..Default::default()
    }
}

pub fn cipher() -> Arc<AesGcmCipher> {
    Arc::new(AesGcmCipher::new(&PAYLOAD_KEY).unwrap())
}

/// A sandbox that accepts both plain and encrypted payloads.
pub fn sandbox() -> SandboxTransport {
    SandboxTransport::new(PARTNER_ID).with_cipher(cipher())
}

pub fn apis(sandbox: &SandboxTransport) -> (QuotesApi, RemittanceApi) {
    let transport = Arc::new(sandbox.clone());
    let quotes = QuotesApi::new(transport.clone());
    let remittance = RemittanceApi::from_config(transport, &encrypted_config()).unwrap();
    (quotes, remittance)
}

fn sender() -> Party {
    Party {
        address_line: Some("1 Main St".to_string()),
        city: Some("O'Fallon".to_string()),
        ..Party::new("John", "Doe", "USA")
    }
}

fn recipient() -> Party {
    Party {
        city: Some("Nairobi".to_string()),
        ..Party::new("Jane", "Wanjiru", "KEN")
    }
}

pub fn forward_quote(reference: &str) -> QuotesRequest {
    QuotesRequest::new(
        reference,
        "tel:+254108989",
        "tel:+254208989",
        MoneyAmount::new(dec!(100.00), "USD"),
        QuoteDirection::Forward {
            receiver_currency: "KES".to_string(),
        },
    )
}

fn payment(reference: &str) -> RemittanceRequest {
    RemittanceRequest::new(
        reference,
        "tel:+254108989",
        "tel:+254208989",
        sender(),
        recipient(),
    )
}

pub fn payment_with_quote(reference: &str, proposal_id: &str) -> RemittanceRequest {
    payment(reference).with_proposal(proposal_id)
}

pub fn one_shot_forward(reference: &str) -> RemittanceRequest {
    payment(reference).forward(MoneyAmount::new(dec!(100.00), "USD"), "KES")
}

pub fn one_shot_reverse(reference: &str) -> RemittanceRequest {
    payment(reference).reverse(MoneyAmount::new(dec!(5000.00), "KES"), "USD")
}

/// Counts calls and answers each with the same response.
pub struct CountingTransport {
    response: WireResponse,
    calls: AtomicUsize,
}

impl CountingTransport {
    pub fn new(response: WireResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn send(&self, _request: WireRequest) -> Result<WireResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
