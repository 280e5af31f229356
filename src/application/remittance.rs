use super::exchange::{
    ENCRYPTED_PAYLOAD_SOURCE, REQUEST_BODY_SOURCE, dispatch, is_blank, malformed, require_partner,
};
use super::normalizer::normalize_response;
use crate::config::ClientConfig;
use crate::domain::failure::ServiceFailure;
use crate::domain::ports::{
    ENCRYPTED_HEADER, Endpoint, Headers, Method, PayloadCipher, RequestParams, SharedCipher,
    SharedTransport, WireRequest, WireResponse,
};
use crate::domain::remittance::{RemittanceRequest, RemittanceResponse};
use crate::error::{ConfigurationError, Result};
use crate::infrastructure::cipher::PlainPayload;
use crate::interfaces::xml::codec::PAYMENT_REQUEST_ROOT;
use crate::interfaces::xml::{from_xml, to_xml};
use std::sync::Arc;
use tracing::{info, warn};

/// Submits payments, quote-bound or one-shot, in plain or encrypted form.
///
/// Both forms run through the same routine; only the cipher strategy
/// differs, so the receipt shape cannot diverge between them. Nothing is
/// retried: a payment is not safely repeatable without a caller-side
/// idempotency key.
#[derive(Clone)]
pub struct RemittanceApi {
    transport: SharedTransport,
    cipher: Option<SharedCipher>,
    encrypt_by_default: bool,
}

impl RemittanceApi {
    /// A plain-payload executor with no encryption available.
    pub fn new(transport: SharedTransport) -> Self {
        Self {
            transport,
            cipher: None,
            encrypt_by_default: false,
        }
    }

    /// Wires the payload cipher and the default-encryption flag from configuration.
    pub fn from_config(
        transport: SharedTransport,
        config: &ClientConfig,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut api = Self::new(transport);
        if let Some(cipher) = config.payload_cipher()? {
            api.cipher = Some(Arc::new(cipher));
        }
        if config.encryption_enabled {
            if api.cipher.is_none() {
                return Err(ConfigurationError::EncryptionNotConfigured);
            }
            api.encrypt_by_default = true;
        }
        Ok(api)
    }

    pub fn with_cipher(mut self, cipher: SharedCipher) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Makes `make_payment` encrypt as well. Needs a cipher at call time.
    pub fn with_default_encryption(mut self, enabled: bool) -> Self {
        self.encrypt_by_default = enabled;
        self
    }

    pub fn encrypts_by_default(&self) -> bool {
        self.encrypt_by_default
    }

    /// Submits a payment, encrypted only when configured to by default.
    pub async fn make_payment(
        &self,
        headers: &Headers,
        params: &RequestParams,
        request: &RemittanceRequest,
    ) -> Result<RemittanceResponse> {
        if self.encrypt_by_default {
            let cipher = self.configured_cipher()?;
            self.execute(cipher.as_ref(), headers, params, request).await
        } else {
            self.execute(&PlainPayload, headers, params, request).await
        }
    }

    /// Submits a payment with request and response bodies encrypted.
    pub async fn make_payment_with_encryption(
        &self,
        headers: &Headers,
        params: &RequestParams,
        request: &RemittanceRequest,
    ) -> Result<RemittanceResponse> {
        let cipher = self.configured_cipher()?;
        self.execute(cipher.as_ref(), headers, params, request).await
    }

    fn configured_cipher(&self) -> std::result::Result<SharedCipher, ConfigurationError> {
        self.cipher
            .clone()
            .ok_or(ConfigurationError::EncryptionNotConfigured)
    }

    async fn execute(
        &self,
        cipher: &dyn PayloadCipher,
        headers: &Headers,
        params: &RequestParams,
        request: &RemittanceRequest,
    ) -> Result<RemittanceResponse> {
        request.validate()?;
        let partner_id = require_partner(params)?;
        let encrypted = cipher.is_active();
        info!(
            partner_id,
            transaction_reference = %request.transaction_reference,
            proposal_id = request.proposal_id.as_deref().unwrap_or("-"),
            encrypted,
            "submitting payment"
        );

        let plaintext = to_xml(PAYMENT_REQUEST_ROOT, request)
            .map_err(|e| ServiceFailure::unknown(None, REQUEST_BODY_SOURCE, e.to_string()))?;
        let body = cipher
            .encrypt(&plaintext)
            .map_err(|e| ServiceFailure::unknown(None, ENCRYPTED_PAYLOAD_SOURCE, e.to_string()))?;

        let mut headers = headers.clone();
        if encrypted {
            headers.insert(ENCRYPTED_HEADER, "true");
        }

        let response = dispatch(
            self.transport.as_ref(),
            WireRequest {
                method: Method::Post,
                endpoint: Endpoint::Payment,
                headers,
                params: params.clone(),
                body,
            },
        )
        .await?;

        if !response.is_success() {
            let failure = rejection(cipher, response);
            warn!(
                status = ?failure.status,
                entries = failure.errors.len(),
                "payment rejected"
            );
            return Err(failure.into());
        }
        if is_blank(&response.body) {
            return Err(malformed("payment response has no body"));
        }

        let plaintext = cipher.decrypt(&response.body).map_err(|e| {
            ServiceFailure::unknown(
                Some(response.status),
                ENCRYPTED_PAYLOAD_SOURCE,
                e.to_string(),
            )
        })?;
        let receipt: RemittanceResponse = from_xml(&plaintext)
            .map_err(|e| malformed(format!("undecodable payment response: {e}")))?;
        if receipt.remittance_id.trim().is_empty() {
            return Err(malformed("payment response carries no remittance id"));
        }

        info!(
            remittance_id = %receipt.remittance_id,
            credited = %receipt.credited_amount,
            status = %receipt.status,
            "payment accepted"
        );
        Ok(receipt)
    }
}

/// Rejections of encrypted calls may come back sealed or in clear; both are
/// normalized.
fn rejection(cipher: &dyn PayloadCipher, response: WireResponse) -> ServiceFailure {
    if !cipher.is_active() {
        return normalize_response(&response);
    }
    match cipher.decrypt(&response.body) {
        Ok(body) => normalize_response(&WireResponse::new(response.status, body)),
        Err(_) => normalize_response(&response),
    }
}
