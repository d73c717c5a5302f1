// src/cooldown/registry.rs
//! Per-item cooldowns: item id → earliest instant the next refresh is allowed.
//!
//! Entries only exist while their instant is in the future. Expired entries are removed
//! lazily by [`CooldownRegistry::remaining_time`] and in bulk by
//! [`CooldownRegistry::sweep_expired`]. Because a sweep only removes entries with
//! `next_allowed_at <= now`, it commutes with a concurrent `set` of a future instant.

use crate::catalog::ItemId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{debug, info};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct CooldownRegistry {
    entries: DashMap<ItemId, DateTime<Utc>>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blocked(&self, id: &ItemId, now: DateTime<Utc>) -> bool {
        self.remaining_time(id, now).is_some()
    }

    /// Time left until `id` may be refreshed, or `None` when it is not blocked.
    pub fn remaining_time(&self, id: &ItemId, now: DateTime<Utc>) -> Option<Duration> {
        let next_allowed_at = *self.entries.get(id)?;
        if next_allowed_at > now {
            (next_allowed_at - now).to_std().ok()
        } else {
            // Stale; the predicate is re-checked so a newer `set` is never dropped.
            self.entries.remove_if(id, |_, at| *at <= now);
            None
        }
    }

    /// Last writer wins.
    pub fn set(&self, id: ItemId, next_allowed_at: DateTime<Utc>) {
        info!("Cooldown for item {} set until {}", id, next_allowed_at);
        self.entries.insert(id, next_allowed_at);
    }

    pub fn next_allowed_at(&self, id: &ItemId) -> Option<DateTime<Utc>> {
        self.entries.get(id).map(|entry| *entry)
    }

    /// Removes every entry whose instant is `<= now` and returns their ids.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<ItemId> {
        let mut expired = Vec::new();
        self.entries.retain(|id, at| {
            let keep = *at > now;
            if !keep {
                expired.push(id.clone());
            }
            keep
        });
        if !expired.is_empty() {
            debug!("Swept {} expired cooldowns", expired.len());
        }
        expired.sort();
        expired
    }

    /// Still-blocking entries with their remaining time, ordered by id.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<(ItemId, Duration)> {
        let mut active: Vec<(ItemId, Duration)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let remaining = (*entry.value() - now).to_std().ok()?;
                (!remaining.is_zero()).then(|| (entry.key().clone(), remaining))
            })
            .collect();
        active.sort_by(|a, b| a.0.cmp(&b.0));
        active
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
