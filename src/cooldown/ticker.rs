// src/cooldown/ticker.rs
//! Background sweep of the cooldown registry.
//!
//! `CooldownTicker::start` spawns a task that sweeps expired entries on a fixed interval
//! and broadcasts a [`CooldownTick`] so views can refresh their countdowns. The task ends
//! on `stop()` or when the ticker is dropped.

use super::clock::TimeSource;
use super::registry::CooldownRegistry;
use crate::catalog::ItemId;
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const TICK_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct CooldownTick {
    pub at: DateTime<Utc>,
    /// Items whose cooldown elapsed since the previous tick
    pub expired: Vec<ItemId>,
    /// Items still cooling down, with remaining time
    pub active: Vec<(ItemId, Duration)>,
}

/// One sweep-and-snapshot step.
pub fn sweep_tick(registry: &CooldownRegistry, now: DateTime<Utc>) -> CooldownTick {
    let expired = registry.sweep_expired(now);
    let active = registry.active(now);
    CooldownTick {
        at: now,
        expired,
        active,
    }
}

pub struct CooldownTicker {
    events: broadcast::Sender<CooldownTick>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CooldownTicker {
    /// Spawns the sweep task. Must be called from within a tokio runtime.
    /// A zero interval is rejected with `ConfigError`.
    pub fn start(
        registry: Arc<CooldownRegistry>,
        clock: Arc<dyn TimeSource>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(TrackerError::ConfigError(
                "Cooldown tick interval cannot be zero".to_string(),
            ));
        }
        let (events, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task_events = events.clone();

        info!("Starting cooldown ticker every {:?}", interval);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let tick = sweep_tick(&registry, clock.now());
                        for id in &tick.expired {
                            debug!("Cooldown elapsed for item {}", id);
                        }
                        // No subscribers is fine.
                        let _ = task_events.send(tick);
                    }
                }
            }
            info!("Cooldown ticker stopped");
        });

        Ok(Self {
            events,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CooldownTick> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Signals the task to finish and waits for it.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for CooldownTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
