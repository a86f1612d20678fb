use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::openrouter::ChatCompletionBody;

/// Raw HTTP result of one attempt; status interpretation is left to `retry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The per-attempt budget elapsed
    Timeout,
    /// No HTTP exchange happened
    Connect(String),
}

/// One POST of a completion body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        api_key: &str,
        body: &ChatCompletionBody,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport (HTTP direct, no SDK)
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(referer) = &config.referer {
            headers.insert(
                "HTTP-Referer",
                HeaderValue::from_str(referer).context("Invalid HTTP-Referer header value")?,
            );
        }
        if let Some(title) = &config.title {
            headers.insert(
                "X-Title",
                HeaderValue::from_str(title).context("Invalid X-Title header value")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        api_key: &str,
        body: &ChatCompletionBody,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(TransportResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(err.to_string())
    }
}
