// src/api/mod.rs
//! Backend collaborator: the `PriceBackend` seam and its HTTP implementation.

pub mod client;
pub mod models;

pub use client::HttpBackend;
pub use models::{ApiEnvelope, RateLimitBody, StoreResult, UpdateResponse};

use crate::catalog::{Item, ItemId};
use crate::error::Result;
use async_trait::async_trait;

/// The two backend operations the tracker depends on.
#[async_trait]
pub trait PriceBackend: Send + Sync {
    /// `GET /api/games`
    async fn fetch_items(&self) -> Result<Vec<Item>>;

    /// `POST /api/games/{id}/update`. A 429 comes back as `TrackerError::RateLimited`.
    async fn request_update(&self, id: &ItemId) -> Result<UpdateResponse>;
}
