//! Upstream HTTP Client
//!
//! Issues the outbound call for a dispatch and relays the upstream status
//! and JSON body back to the handler. No retries, no backoff: a non-2xx
//! upstream response is passed through untouched so the browser client can
//! tell a provider rejection apart from a proxy failure.

use crate::error::{ProxyError, Result};
use crate::upstream::target::{SearchRequest, ServiceKind, TAVILY_API_KEY_HEADER};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP client for upstream calls
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Forward a request body to the upstream service using the selected
    /// key, returning the upstream status and parsed JSON body verbatim.
    pub async fn forward(
        &self,
        kind: ServiceKind,
        endpoint: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value)> {
        let request = match kind {
            ServiceKind::Groq => self.client.post(endpoint).bearer_auth(api_key).json(body),
            ServiceKind::Gemini => self
                .client
                .post(endpoint)
                .query(&[("key", api_key)])
                .json(body),
            ServiceKind::Search => {
                let normalized: SearchRequest =
                    serde_json::from_value(body.clone()).unwrap_or_default();
                self.client
                    .post(endpoint)
                    .header(TAVILY_API_KEY_HEADER, api_key)
                    .json(&normalized)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::from_upstream(kind.display_name(), e))?;

        let status = response.status();
        debug!(service = %kind, status = %status, "upstream responded");

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProxyError::from_upstream(kind.display_name(), e))?;

        Ok((status, payload))
    }
}
