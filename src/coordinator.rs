// src/coordinator.rs
//! Refresh orchestration: `Idle → Requesting → {Applied | Rejected | Failed} → Idle`.
//!
//! Only one refresh may be in flight across all items. The local cooldown registry is a
//! cache of the server's rate-limit state: a 429 overwrites it with the server's
//! instant, while an indeterminate failure leaves it alone.

use crate::api::PriceBackend;
use crate::catalog::{CatalogStore, Item, ItemId};
use crate::cooldown::{CooldownRegistry, TimeSource};
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshState {
    Idle,
    Requesting {
        item_id: ItemId,
        since: DateTime<Utc>,
    },
}

/// Result of an applied refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    /// The item after reconciliation
    pub item: Item,
    /// Stores whose scrape failed; their quotes were not stored
    pub failed_stores: Vec<String>,
    pub next_update_available: DateTime<Utc>,
}

pub struct UpdateCoordinator {
    backend: Arc<dyn PriceBackend>,
    catalog: Arc<CatalogStore>,
    cooldowns: Arc<CooldownRegistry>,
    clock: Arc<dyn TimeSource>,
    state: Mutex<RefreshState>,
}

/// Holds the coordinator in `Requesting`; dropping it returns to `Idle`, including when
/// the refresh future itself is dropped mid-request.
struct InFlight<'a> {
    state: &'a Mutex<RefreshState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = RefreshState::Idle;
    }
}

impl UpdateCoordinator {
    pub fn new(
        backend: Arc<dyn PriceBackend>,
        catalog: Arc<CatalogStore>,
        cooldowns: Arc<CooldownRegistry>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            backend,
            catalog,
            cooldowns,
            clock,
            state: Mutex::new(RefreshState::Idle),
        }
    }

    pub fn state(&self) -> RefreshState {
        self.lock_state().clone()
    }

    pub fn is_busy(&self) -> bool {
        matches!(*self.lock_state(), RefreshState::Requesting { .. })
    }

    /// Refreshes the currently selected item.
    pub async fn refresh_selected(&self) -> Result<RefreshReport> {
        let id = self
            .catalog
            .selected_id()
            .await
            .ok_or(TrackerError::NoSelection)?;
        self.refresh(&id).await
    }

    pub async fn refresh(&self, id: &ItemId) -> Result<RefreshReport> {
        let _in_flight = self.begin(id)?;

        if !self.catalog.contains(id).await {
            return Err(TrackerError::NotFound(id.clone()));
        }

        info!("Requesting price update for item {}", id);
        match self.backend.request_update(id).await {
            Ok(response) => {
                let quotes = response.successful_quotes();
                let failed_stores: Vec<String> = response
                    .failed_stores()
                    .into_iter()
                    .map(String::from)
                    .collect();
                let applied = self
                    .catalog
                    .apply_update(id, quotes, self.clock.now())
                    .await;
                // The server accepted the refresh, so its cooldown stands either way.
                self.cooldowns.set(id.clone(), response.next_update_available);
                let item = applied?;
                info!(
                    "Item {}: Applied {} quotes ({} stores failed), next update at {}",
                    id,
                    item.prices.len(),
                    failed_stores.len(),
                    response.next_update_available
                );
                Ok(RefreshReport {
                    item,
                    failed_stores,
                    next_update_available: response.next_update_available,
                })
            }
            Err(TrackerError::RateLimited {
                message,
                next_available,
            }) => {
                warn!(
                    "Item {}: Rejected by server until {}: {}",
                    id, next_available, message
                );
                self.cooldowns.set(id.clone(), next_available);
                Err(TrackerError::RateLimited {
                    message,
                    next_available,
                })
            }
            Err(TrackerError::UpdateFailed(reason)) => {
                error!("Item {}: Failed: {}", id, reason);
                Err(TrackerError::UpdateFailed(reason))
            }
            Err(other) => {
                error!("Item {}: Failed: {}", id, other);
                Err(TrackerError::UpdateFailed(other.to_string()))
            }
        }
    }

    /// Busy and cooldown gates plus the transition to `Requesting`, under one lock so
    /// two callers cannot both pass.
    fn begin(&self, id: &ItemId) -> Result<InFlight<'_>> {
        let mut state = self.lock_state();
        if let RefreshState::Requesting { item_id, .. } = &*state {
            debug!("Refresh of {} rejected: {} is in flight", id, item_id);
            return Err(TrackerError::Busy);
        }

        let now = self.clock.now();
        if let Some(remaining) = self.cooldowns.remaining_time(id, now) {
            debug!("Refresh of {} rejected: cooling down for {:?}", id, remaining);
            return Err(TrackerError::Cooldown(remaining));
        }

        *state = RefreshState::Requesting {
            item_id: id.clone(),
            since: now,
        };
        Ok(InFlight { state: &self.state })
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{StoreResult, UpdateResponse};
    use crate::cooldown::ManualClock;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    /// Parks every update request until released.
    struct ParkedBackend {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PriceBackend for ParkedBackend {
        async fn fetch_items(&self) -> Result<Vec<Item>> {
            Ok(Vec::new())
        }

        async fn request_update(&self, _id: &ItemId) -> Result<UpdateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(UpdateResponse {
                results: vec![StoreResult::ok("A", 1000.0, "https://a")],
                next_update_available: t0() + chrono::Duration::minutes(5),
            })
        }
    }

    async fn setup() -> (Arc<ParkedBackend>, Arc<UpdateCoordinator>) {
        let backend = Arc::new(ParkedBackend {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let catalog = Arc::new(CatalogStore::new());
        catalog
            .replace_all(vec![Item::new("1", "A", "PS5"), Item::new("2", "B", "PS4")])
            .await;
        let coordinator = Arc::new(UpdateCoordinator::new(
            backend.clone(),
            catalog,
            Arc::new(CooldownRegistry::new()),
            Arc::new(ManualClock::new(t0())),
        ));
        (backend, coordinator)
    }

    #[tokio::test]
    async fn state_is_requesting_while_in_flight() {
        let (backend, coordinator) = setup().await;
        let task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh(&ItemId::new("1")).await })
        };

        backend.entered.notified().await;
        assert_eq!(
            coordinator.state(),
            RefreshState::Requesting { item_id: ItemId::new("1"), since: t0() }
        );
        assert!(coordinator.is_busy());

        backend.release.notify_one();
        task.await.unwrap().unwrap();
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn dropped_refresh_returns_to_idle() {
        let (backend, coordinator) = setup().await;
        let id = ItemId::new("1");
        let mut refresh = Box::pin(coordinator.refresh(&id));

        tokio::select! {
            _ = &mut refresh => panic!("request should be parked"),
            _ = backend.entered.notified() => {}
        }
        assert!(coordinator.is_busy());
        drop(refresh);

        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_item_never_reaches_backend() {
        let (backend, coordinator) = setup().await;
        let err = coordinator.refresh(&ItemId::new("404")).await.unwrap_err();
        assert_eq!(err, TrackerError::NotFound(ItemId::new("404")));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn cooldown_rejects_before_any_call() {
        let (backend, coordinator) = setup().await;
        coordinator
            .cooldowns
            .set(ItemId::new("2"), t0() + chrono::Duration::seconds(30));

        let err = coordinator.refresh(&ItemId::new("2")).await.unwrap_err();
        assert_eq!(err, TrackerError::Cooldown(Duration::from_secs(30)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }
}
