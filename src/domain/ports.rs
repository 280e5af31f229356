use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const PARTNER_ID_PARAM: &str = "partner-id";
pub const CONTENT_TYPE: &str = "content-type";
pub const ACCEPT: &str = "accept";
pub const ENCRYPTED_HEADER: &str = "x-encrypted";
pub const APPLICATION_XML: &str = "application/xml";

/// Outbound headers. Names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Content-Type` and `Accept` set to XML.
    pub fn xml() -> Self {
        let mut headers = Self::new();
        headers.insert(CONTENT_TYPE, APPLICATION_XML);
        headers.insert(ACCEPT, APPLICATION_XML);
        headers
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_encrypted(&self) -> bool {
        self.get(ENCRYPTED_HEADER)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

/// Path and query parameters; `partner-id` is required by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_partner(partner_id: impl Into<String>) -> Self {
        let mut params = Self::new();
        params.insert(PARTNER_ID_PARAM, partner_id);
        params
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The partner id, if present and non-blank.
    pub fn partner_id(&self) -> Option<&str> {
        self.get(PARTNER_ID_PARAM)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Service resources the core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Quotes,
    Payment,
}

impl Endpoint {
    pub fn path(&self, partner_id: &str) -> String {
        let resource = match self {
            Endpoint::Quotes => "quotes",
            Endpoint::Payment => "payment",
        };
        format!("/send/v1/partners/{partner_id}/crossborder/{resource}")
    }
}

#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub headers: Headers,
    pub params: RequestParams,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP status line: connection, timeout, TLS.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("request timed out")]
    Timeout,
    #[error("missing path parameter `{0}`")]
    MissingParam(&'static str),
}

/// Moves bytes to the service and back. Retries, pooling and TLS live here,
/// never in the core.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

pub type SharedTransport = Arc<dyn Transport>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("payload encryption failed: {0}")]
    Encrypt(String),
    #[error("payload decryption failed: {0}")]
    Decrypt(String),
}

/// Body transformation applied around the transport.
///
/// Implementations must satisfy `decrypt(encrypt(x)) == x`.
pub trait PayloadCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Whether the wire carries ciphertext, so the request gets flagged.
    fn is_active(&self) -> bool {
        true
    }
}

pub type SharedCipher = Arc<dyn PayloadCipher>;
