//! Catalog data structures as served by the backend's `/api/games` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable item identifier. The backend may send ids as JSON strings or integers;
/// both are normalised to text so lookups and URL building use one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawItemId")]
pub struct ItemId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemId {
    Int(i64),
    Text(String),
}

impl From<RawItemId> for ItemId {
    fn from(raw: RawItemId) -> Self {
        match raw {
            RawItemId::Int(n) => ItemId(n.to_string()),
            RawItemId::Text(s) => ItemId(s),
        }
    }
}

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

/// One retail source's price for an item, from a single refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub store: String,
    pub price: f64,
    pub url: String,
}

impl PriceQuote {
    pub fn new(store: &str, price: f64, url: &str) -> Self {
        Self {
            store: store.to_string(),
            price,
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub image: String,
    /// Replaced wholesale by each successful refresh.
    #[serde(default)]
    pub prices: Vec<PriceQuote>,
    /// Only set after a successful refresh.
    #[serde(rename = "lastUpdate", default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(id: &str, name: &str, platform: &str) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.to_string(),
            platform: platform.to_string(),
            image: String::new(),
            prices: Vec::new(),
            last_update: None,
        }
    }

    pub fn has_prices(&self) -> bool {
        !self.prices.is_empty()
    }
}
