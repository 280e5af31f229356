use crate::domain::failure::ServiceFailure;
use crate::domain::ports::{RequestParams, Transport, WireRequest, WireResponse};
use crate::error::{ApiError, ConfigurationError};
use tracing::{debug, warn};

pub(crate) const TRANSPORT_SOURCE: &str = "transport";
pub(crate) const REQUEST_BODY_SOURCE: &str = "request_body";
pub(crate) const ENCRYPTED_PAYLOAD_SOURCE: &str = "encrypted_payload";

pub(crate) fn require_partner(params: &RequestParams) -> Result<&str, ConfigurationError> {
    params.partner_id().ok_or(ConfigurationError::MissingPartnerId)
}

/// Sends through the transport, turning transport faults into a `ServiceFailure`.
pub(crate) async fn dispatch(
    transport: &dyn Transport,
    request: WireRequest,
) -> Result<WireResponse, ServiceFailure> {
    let endpoint = request.endpoint;
    match transport.send(request).await {
        Ok(response) => {
            debug!(?endpoint, status = response.status, bytes = response.body.len(), "response received");
            Ok(response)
        }
        Err(e) => {
            warn!(?endpoint, error = %e, "transport failure");
            Err(ServiceFailure::unknown(None, TRANSPORT_SOURCE, e.to_string()))
        }
    }
}

pub(crate) fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

pub(crate) fn malformed(what: impl std::fmt::Display) -> ApiError {
    warn!(reason = %what, "malformed success response");
    ApiError::MalformedResponse(what.to_string())
}
