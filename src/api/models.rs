//! Backend wire structures for the two endpoints the tracker consumes.

use crate::catalog::PriceQuote;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// `{ success, data }` wrapper used by every successful backend response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    /// Present on `success: false` responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-store outcome of a refresh; failed scrapes usually carry no price or url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResult {
    pub store: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreResult {
    pub fn ok(store: &str, price: f64, url: &str) -> Self {
        Self {
            store: store.to_string(),
            price: Some(price),
            url: Some(url.to_string()),
            success: true,
            error: None,
        }
    }

    pub fn failed(store: &str, error: &str) -> Self {
        Self {
            store: store.to_string(),
            price: None,
            url: None,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// `data` payload of `POST /api/games/{id}/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub results: Vec<StoreResult>,
    #[serde(rename = "nextUpdateAvailable")]
    pub next_update_available: DateTime<Utc>,
}

impl UpdateResponse {
    /// Quotes from stores that scraped successfully, in response order. Failed stores
    /// are dropped, never stored as placeholders.
    pub fn successful_quotes(&self) -> Vec<PriceQuote> {
        self.results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| match r.price {
                Some(price) if price.is_finite() && price >= 0.0 => Some(PriceQuote {
                    store: r.store.clone(),
                    price,
                    url: r.url.clone().unwrap_or_default(),
                }),
                _ => {
                    warn!("Store {} reported success without a usable price", r.store);
                    None
                }
            })
            .collect()
    }

    pub fn failed_stores(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.store.as_str())
            .collect()
    }
}

/// Body of a 429 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitBody {
    pub error: String,
    #[serde(rename = "nextUpdateAvailable")]
    pub next_update_available: DateTime<Utc>,
}
