use super::exchange::{REQUEST_BODY_SOURCE, dispatch, is_blank, malformed, require_partner};
use super::normalizer::normalize_response;
use crate::domain::failure::ServiceFailure;
use crate::domain::ports::{Endpoint, Headers, Method, RequestParams, SharedTransport, WireRequest};
use crate::domain::quote::{QuotesRequest, QuotesResponse};
use crate::error::Result;
use crate::interfaces::xml::codec::QUOTE_REQUEST_ROOT;
use crate::interfaces::xml::{from_xml, to_xml};
use tracing::{info, warn};

/// Requests exchange-rate proposals. Proposals are never cached: each call
/// goes to the service.
#[derive(Clone)]
pub struct QuotesApi {
    transport: SharedTransport,
}

impl QuotesApi {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }

    pub async fn get_quote(
        &self,
        headers: &Headers,
        params: &RequestParams,
        request: &QuotesRequest,
    ) -> Result<QuotesResponse> {
        let partner_id = require_partner(params)?;
        info!(
            partner_id,
            transaction_reference = %request.transaction_reference,
            amount = %request.payment_amount,
            "requesting quote"
        );

        let body = to_xml(QUOTE_REQUEST_ROOT, request)
            .map_err(|e| ServiceFailure::unknown(None, REQUEST_BODY_SOURCE, e.to_string()))?;
        let response = dispatch(
            self.transport.as_ref(),
            WireRequest {
                method: Method::Post,
                endpoint: Endpoint::Quotes,
                headers: headers.clone(),
                params: params.clone(),
                body,
            },
        )
        .await?;

        if !response.is_success() {
            let failure = normalize_response(&response);
            warn!(status = response.status, entries = failure.errors.len(), "quote rejected");
            return Err(failure.into());
        }
        if is_blank(&response.body) {
            return Err(malformed("quote response has no body"));
        }

        let quotes: QuotesResponse = from_xml(&response.body)
            .map_err(|e| malformed(format!("undecodable quote response: {e}")))?;
        info!(proposals = quotes.proposals().len(), "quote received");
        Ok(quotes)
    }
}
