// src/notify/http.rs

//! HTTP status publisher.
//!
//! Posts a Mastodon-compatible `{"status": …}` body to the configured
//! endpoint with a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::notify::Publisher;

/// Publisher backed by a status-posting HTTP endpoint.
pub struct HttpPublisher {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl HttpPublisher {
    /// Create a publisher for the given endpoint.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "status": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::publish(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}
