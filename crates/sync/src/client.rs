//! HTTP client for the accounting gateway.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tallybridge_shared::{AppError, AppResult, Gateway};
use tracing::debug;

/// Thin wrapper around `reqwest::Client` for the XML-over-HTTP gateway.
///
/// Every request carries the same bounded timeout so a failed remote
/// system cannot stall the pipeline indefinitely. There is no retry and
/// no cancellation: an issued request runs to completion or timeout.
#[derive(Debug, Clone)]
pub struct TallyClient {
    http: reqwest::Client,
    gateway: Gateway,
}

impl TallyClient {
    /// Creates a client bound to the resolved gateway.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`] if the HTTP client cannot be built.
    pub fn new(gateway: Gateway) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(gateway.timeout_secs))
            .build()
            .map_err(|e| AppError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, gateway })
    }

    /// The company context every request is issued under.
    #[must_use]
    pub fn company(&self) -> &str {
        &self.gateway.company
    }

    /// Posts an XML payload to the gateway and returns the raw response
    /// body.
    ///
    /// The body is returned verbatim whatever the HTTP status: the remote
    /// engine reports import failures inside a 200 response, and the raw
    /// text is the audit trail either way.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`] on connection-level failure or
    /// timeout.
    pub async fn post_xml(&self, body: String) -> AppResult<String> {
        debug!(url = %self.gateway.url, bytes = body.len(), "posting XML to gateway");
        let response = self
            .http
            .post(&self.gateway.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        debug!(%status, bytes = text.len(), "gateway responded");
        Ok(text)
    }
}
