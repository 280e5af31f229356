use crate::config::ClientConfig;
use crate::domain::ports::{
    Method, PARTNER_ID_PARAM, Transport, TransportError, WireRequest, WireResponse,
};
use crate::error::ConfigurationError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// HTTPS transport backed by `reqwest`.
///
/// `partner-id` fills the path; any other parameter goes to the query string.
/// Timeouts are enforced here. Nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::InvalidValue {
                field: "base_url".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    fn url(&self, request: &WireRequest) -> Result<String, TransportError> {
        let partner_id = request
            .params
            .partner_id()
            .ok_or(TransportError::MissingParam(PARTNER_ID_PARAM))?;
        Ok(format!("{}{}", self.base_url, request.endpoint.path(partner_id)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let url = self.url(&request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        let query: Vec<(&str, &str)> = request
            .params
            .iter()
            .filter(|(name, _)| *name != PARTNER_ID_PARAM)
            .collect();
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        let response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(into_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(into_transport_error)?;

        Ok(WireResponse::new(status, body.to_vec()))
    }
}

fn into_transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}
