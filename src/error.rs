use crate::domain::failure::ServiceFailure;
use miette::Diagnostic;
use thiserror::Error;

/// Every way a quote or payment call can fail.
///
/// Callers are expected to branch on [`ApiError::Service`] and inspect the
/// `(source, reason_code)` pairs of its entries. The other variants are local
/// defects that no upstream retry can fix.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error(transparent)]
    #[diagnostic(code(crossborder::service))]
    Service(#[from] ServiceFailure),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(code(crossborder::validation))]
    Validation(#[from] ValidationError),

    /// Upstream answered with a success status but no usable receipt.
    #[error("malformed success response: {0}")]
    #[diagnostic(code(crossborder::malformed_response))]
    MalformedResponse(String),
}

/// Client-side setup defects. Fatal to the call and never retryable.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("partner id is missing")]
    #[diagnostic(
        code(crossborder::config::partner_id),
        help("set `partner_id` in the config file or CROSSBORDER_PARTNER_ID")
    )]
    MissingPartnerId,

    #[error("payload encryption requested but no payload key is configured")]
    #[diagnostic(
        code(crossborder::config::encryption),
        help("set `payload_key` to a base64-encoded 32-byte key")
    )]
    EncryptionNotConfigured,

    #[error("invalid payload key: {0}")]
    #[diagnostic(code(crossborder::config::payload_key))]
    InvalidKey(String),

    #[error("invalid config value for {field}: {message}")]
    #[diagnostic(code(crossborder::config::invalid_value))]
    InvalidValue { field: String, message: String },

    #[error("failed to read config: {0}")]
    #[diagnostic(code(crossborder::config::read))]
    Read(String),
}

/// Structural problems caught before a payment request reaches the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("proposal_id cannot be combined with {0}")]
    ProposalWithAmount(&'static str),

    #[error("either proposal_id or an amount with currency is required")]
    MissingAmount,

    #[error("payment_amount and receiving_amount are mutually exclusive")]
    AmbiguousDirection,

    #[error("{0} requires both an amount and a currency")]
    IncompleteAmount(&'static str),
}

pub type Result<T> = std::result::Result<T, ApiError>;
