//! Reference API access.
//!
//! [`ReferenceApi`] is the seam the orchestrator fetches through. The HTTP
//! implementation maps every transport problem to `NetworkFailure` and every
//! body problem to `MalformedResponse`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tracing::{debug, warn};

use lorekeeper_core::config::HttpConfig;
use lorekeeper_core::types::{CollectionResponse, ListItem};

use crate::error::ChatError;

/// Fetches JSON documents by absolute URL.
#[async_trait]
pub trait ReferenceApi: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, ChatError>;
}

/// Fetch a collection endpoint and return its `results` entries.
pub async fn fetch_collection<A: ReferenceApi + ?Sized>(
    api: &A,
    url: &str,
) -> Result<Vec<ListItem>, ChatError> {
    let body = api.get_json(url).await?;
    parse_collection(body)
}

/// Extract list items from a collection body.
pub fn parse_collection(body: Value) -> Result<Vec<ListItem>, ChatError> {
    let parsed: CollectionResponse = serde_json::from_value(body)
        .map_err(|e| ChatError::MalformedResponse(format!("collection body: {}", e)))?;
    Ok(parsed.results)
}

// =============================================================================
// HTTP client
// =============================================================================

/// [`ReferenceApi`] over HTTPS with reqwest.
#[derive(Debug, Clone)]
pub struct HttpReferenceClient {
    client: reqwest::Client,
}

impl HttpReferenceClient {
    pub fn new(config: &HttpConfig) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        let client = builder
            .build()
            .map_err(|e| ChatError::NetworkFailure(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReferenceApi for HttpReferenceClient {
    async fn get_json(&self, url: &str) -> Result<Value, ChatError> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChatError::NetworkFailure(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Reference API returned an error status");
            return Err(ChatError::NetworkFailure(format!("HTTP {} from {}", status, url)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ChatError::NetworkFailure(format!("reading body of {}: {}", url, e)))?;

        serde_json::from_str(&text)
            .map_err(|e| ChatError::MalformedResponse(format!("invalid JSON from {}: {}", url, e)))
    }
}
