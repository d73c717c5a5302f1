// src/api/client.rs
//! reqwest implementation of [`PriceBackend`].
//!
//! Status and body decoding live in plain functions so they can be exercised without a
//! running backend.

use super::models::{ApiEnvelope, RateLimitBody, UpdateResponse};
use super::PriceBackend;
use crate::catalog::{Item, ItemId};
use crate::config::Config;
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use url::Url;

const TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| TrackerError::ConfigError(format!("Invalid API_URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TrackerError::ConfigError(format!(
                "API_URL '{}' cannot be used as a base URL",
                config.api_url
            )));
        }
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TrackerError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        endpoint(&self.base_url, segments)
    }
}

/// Appends path segments to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[async_trait]
impl PriceBackend for HttpBackend {
    async fn fetch_items(&self) -> Result<Vec<Item>> {
        let url = self.endpoint(&["api", "games"]);
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_items(status, &body)
    }

    async fn request_update(&self, id: &ItemId) -> Result<UpdateResponse> {
        let url = self.endpoint(&["api", "games", id.as_str(), "update"]);
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_update(status, &body)
    }
}

pub fn decode_items(status: u16, body: &str) -> Result<Vec<Item>> {
    if !(200..300).contains(&status) {
        warn!("Catalog fetch returned HTTP {}", status);
        return Err(TrackerError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }
    let envelope: ApiEnvelope<Vec<Item>> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(TrackerError::NetworkError(
            envelope
                .error
                .unwrap_or_else(|| "backend reported an unsuccessful catalog fetch".to_string()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| TrackerError::ParseError("catalog response has no data".to_string()))
}

/// A 429 is an expected outcome carrying the server's cooldown, not a generic failure.
pub fn decode_update(status: u16, body: &str) -> Result<UpdateResponse> {
    if status == TOO_MANY_REQUESTS {
        let rejection: RateLimitBody = serde_json::from_str(body)?;
        return Err(TrackerError::RateLimited {
            message: rejection.error,
            next_available: rejection.next_update_available,
        });
    }
    if !(200..300).contains(&status) {
        warn!("Price update returned HTTP {}", status);
        return Err(TrackerError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }
    let envelope: ApiEnvelope<UpdateResponse> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(TrackerError::UpdateFailed(
            envelope
                .error
                .unwrap_or_else(|| "backend reported an unsuccessful update".to_string()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| TrackerError::ParseError("update response has no data".to_string()))
}
