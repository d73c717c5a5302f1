// src/dashboard.rs
//! One user session: owns the catalog, cooldowns and coordinator, and keeps the
//! user-visible state (loading flag, error banner) between commands.

use crate::api::PriceBackend;
use crate::catalog::{CatalogStore, Item, ItemId};
use crate::coordinator::{RefreshReport, UpdateCoordinator};
use crate::cooldown::{CooldownRegistry, CooldownTick, CooldownTicker, TimeSource};
use crate::error::{Result, TrackerError};
use crate::presentation::render::action_label;
use crate::presentation::{CardView, DashboardView};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

pub struct Dashboard {
    backend: Arc<dyn PriceBackend>,
    catalog: Arc<CatalogStore>,
    cooldowns: Arc<CooldownRegistry>,
    clock: Arc<dyn TimeSource>,
    coordinator: UpdateCoordinator,
    loading: AtomicBool,
    banner: RwLock<Option<String>>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn PriceBackend>, clock: Arc<dyn TimeSource>) -> Self {
        let catalog = Arc::new(CatalogStore::new());
        let cooldowns = Arc::new(CooldownRegistry::new());
        let coordinator = UpdateCoordinator::new(
            backend.clone(),
            catalog.clone(),
            cooldowns.clone(),
            clock.clone(),
        );
        Self {
            backend,
            catalog,
            cooldowns,
            clock,
            coordinator,
            loading: AtomicBool::new(false),
            banner: RwLock::new(None),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn cooldowns(&self) -> &Arc<CooldownRegistry> {
        &self.cooldowns
    }

    pub fn coordinator(&self) -> &UpdateCoordinator {
        &self.coordinator
    }

    /// Starts the periodic cooldown sweep for this session.
    pub fn start_ticker(&self, interval: Duration) -> Result<CooldownTicker> {
        CooldownTicker::start(self.cooldowns.clone(), self.clock.clone(), interval)
    }

    /// Recomputed action label for the selected item after a tick, while it is still
    /// cooling down.
    pub async fn countdown_label(&self, tick: &CooldownTick) -> Option<String> {
        let selected = self.catalog.selected_id().await?;
        let (_, remaining) = tick.active.iter().find(|(id, _)| *id == selected)?;
        Some(action_label(self.coordinator.is_busy(), Some(*remaining)))
    }

    /// Initial (or repeated) catalog load.
    pub async fn load(&self) -> Result<Vec<Item>> {
        self.loading.store(true, Ordering::SeqCst);
        self.set_banner(None);
        let result = self.catalog.fetch_all(self.backend.as_ref()).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("Catalog load failed: {}", e);
                self.set_banner(Some(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn select(&self, id: &ItemId) -> Result<()> {
        self.catalog.select(id).await.map_err(|e| {
            self.set_banner(Some(e.user_message()));
            e
        })
    }

    /// Refreshes the selected item and records the outcome in the banner. A refresh
    /// attempted while another is running is ignored without touching the banner.
    pub async fn refresh_selected(&self) -> Result<RefreshReport> {
        let result = self.coordinator.refresh_selected().await;
        match &result {
            Ok(report) => {
                self.set_banner(None);
                info!("Refreshed {} with {} prices", report.item.name, report.item.prices.len());
            }
            Err(TrackerError::Busy) => {}
            Err(e) => self.set_banner(Some(e.user_message())),
        }
        result
    }

    pub fn banner(&self) -> Option<String> {
        self.banner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear_banner(&self) {
        self.set_banner(None);
    }

    fn set_banner(&self, message: Option<String>) {
        *self.banner.write().unwrap_or_else(|e| e.into_inner()) = message;
    }

    /// Snapshot for rendering, with countdowns computed against the session clock.
    pub async fn view(&self) -> DashboardView {
        let now = self.clock.now();
        let selected = self.catalog.selected().await;
        let selected_id = selected.as_ref().map(|item| item.id.clone());

        let cards = self
            .catalog
            .items()
            .await
            .into_iter()
            .map(|item| CardView {
                selected: selected_id.as_ref() == Some(&item.id),
                cooldown: self.cooldowns.remaining_time(&item.id, now),
                id: item.id,
                name: item.name,
                platform: item.platform,
            })
            .collect();

        let selected_cooldown = selected_id
            .as_ref()
            .and_then(|id| self.cooldowns.remaining_time(id, now));

        DashboardView {
            loading: self.loading.load(Ordering::SeqCst),
            updating: self.coordinator.is_busy(),
            banner: self.banner(),
            cards,
            selected,
            selected_cooldown,
        }
    }
}
