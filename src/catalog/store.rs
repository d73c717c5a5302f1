// src/catalog/store.rs
//! Ordered item collection plus the single "selected" pointer.
//!
//! Selection is stored as an id and resolved on read, so an in-place update of the
//! selected item is visible in the detail view without any copy to keep in sync.

use super::models::{Item, ItemId, PriceQuote};
use crate::api::PriceBackend;
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct CatalogState {
    items: Vec<Item>,
    selected: Option<ItemId>,
}

#[derive(Debug, Default)]
pub struct CatalogStore {
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the full catalog and replaces the local collection.
    ///
    /// Any failure is reported as `NetworkError` and leaves the previous collection and
    /// selection untouched; there is no partial replacement.
    pub async fn fetch_all(&self, backend: &dyn PriceBackend) -> Result<Vec<Item>> {
        let items = backend.fetch_items().await.map_err(|e| match e {
            TrackerError::NetworkError(_) => e,
            other => TrackerError::NetworkError(other.to_string()),
        })?;
        Ok(self.replace_all(items).await)
    }

    /// Replaces the collection, keeping the first copy of any duplicated id, and repairs
    /// the selection: unset or dangling selections move to the first item.
    pub async fn replace_all(&self, items: Vec<Item>) -> Vec<Item> {
        let mut seen = HashSet::with_capacity(items.len());
        let items: Vec<Item> = items
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.id.clone());
                if !fresh {
                    warn!("Dropping duplicate catalog entry for id {}", item.id);
                }
                fresh
            })
            .collect();

        let mut state = self.state.write().await;
        state.items = items;

        let selection_resolves = state
            .selected
            .as_ref()
            .map_or(false, |id| state.items.iter().any(|i| &i.id == id));
        if !selection_resolves {
            state.selected = state.items.first().map(|i| i.id.clone());
            debug!("Selection defaulted to {:?}", state.selected);
        }

        info!("Catalog loaded with {} items", state.items.len());
        state.items.clone()
    }

    pub async fn select(&self, id: &ItemId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.items.iter().any(|i| &i.id == id) {
            return Err(TrackerError::NotFound(id.clone()));
        }
        state.selected = Some(id.clone());
        debug!("Selected item {}", id);
        Ok(())
    }

    /// Replaces the item's prices and last-update timestamp in place.
    pub async fn apply_update(
        &self,
        id: &ItemId,
        prices: Vec<PriceQuote>,
        timestamp: DateTime<Utc>,
    ) -> Result<Item> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
        item.prices = prices;
        item.last_update = Some(timestamp);
        debug!("Applied {} quotes to item {}", item.prices.len(), id);
        Ok(item.clone())
    }

    pub async fn items(&self) -> Vec<Item> {
        self.state.read().await.items.clone()
    }

    pub async fn get(&self, id: &ItemId) -> Option<Item> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|i| &i.id == id)
            .cloned()
    }

    pub async fn contains(&self, id: &ItemId) -> bool {
        self.state.read().await.items.iter().any(|i| &i.id == id)
    }

    pub async fn selected_id(&self) -> Option<ItemId> {
        self.state.read().await.selected.clone()
    }

    /// The selected item, resolved against the current collection.
    pub async fn selected(&self) -> Option<Item> {
        let state = self.state.read().await;
        let id = state.selected.as_ref()?;
        state.items.iter().find(|i| &i.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UpdateResponse;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct StaticBackend {
        items: Option<Vec<Item>>,
    }

    #[async_trait]
    impl PriceBackend for StaticBackend {
        async fn fetch_items(&self) -> Result<Vec<Item>> {
            self.items
                .clone()
                .ok_or_else(|| TrackerError::HttpStatus { status: 500, body: "boom".to_string() })
        }

        async fn request_update(&self, id: &ItemId) -> Result<UpdateResponse> {
            Err(TrackerError::NotFound(id.clone()))
        }
    }

    fn catalog() -> Vec<Item> {
        vec![
            Item::new("1", "God of War Ragnarok", "PS5"),
            Item::new("2", "Spider-Man 2", "PS5"),
            Item::new("3", "The Last of Us Part II", "PS4"),
        ]
    }

    #[tokio::test]
    async fn fetch_selects_first_item_by_default() {
        let store = CatalogStore::new();
        let backend = StaticBackend { items: Some(catalog()) };
        let items = store.fetch_all(&backend).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(store.selected_id().await, Some(ItemId::new("1")));
    }

    #[tokio::test]
    async fn refetch_keeps_existing_selection() {
        let store = CatalogStore::new();
        let backend = StaticBackend { items: Some(catalog()) };
        store.fetch_all(&backend).await.unwrap();
        store.select(&ItemId::new("2")).await.unwrap();
        store.fetch_all(&backend).await.unwrap();
        assert_eq!(store.selected_id().await, Some(ItemId::new("2")));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_untouched() {
        let store = CatalogStore::new();
        store.replace_all(catalog()).await;
        store.select(&ItemId::new("3")).await.unwrap();

        let err = store
            .fetch_all(&StaticBackend { items: None })
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NetworkError(_)));
        assert_eq!(store.len().await, 3);
        assert_eq!(store.selected_id().await, Some(ItemId::new("3")));
    }

    #[tokio::test]
    async fn dangling_selection_is_repaired() {
        let store = CatalogStore::new();
        store.replace_all(catalog()).await;
        store.select(&ItemId::new("3")).await.unwrap();
        store.replace_all(vec![Item::new("9", "Gran Turismo 7", "PS5")]).await;
        assert_eq!(store.selected_id().await, Some(ItemId::new("9")));

        store.replace_all(Vec::new()).await;
        assert_eq!(store.selected_id().await, None);
        assert!(store.selected().await.is_none());
    }

    #[tokio::test]
    async fn duplicate_ids_keep_first_copy() {
        let store = CatalogStore::new();
        let mut items = catalog();
        items.push(Item::new("1", "Duplicate", "PS4"));
        store.replace_all(items).await;
        assert_eq!(store.len().await, 3);
        assert_eq!(store.get(&ItemId::new("1")).await.unwrap().name, "God of War Ragnarok");
    }

    #[tokio::test]
    async fn select_unknown_id_is_not_found() {
        let store = CatalogStore::new();
        store.replace_all(catalog()).await;
        let err = store.select(&ItemId::new("42")).await.unwrap_err();
        assert_eq!(err, TrackerError::NotFound(ItemId::new("42")));
        assert_eq!(store.selected_id().await, Some(ItemId::new("1")));
    }

    #[tokio::test]
    async fn apply_update_is_visible_through_selection() {
        let store = CatalogStore::new();
        store.replace_all(catalog()).await;
        let now = Utc::now();
        let prices = vec![
            PriceQuote::new("weplay", 59990.0, "https://weplay.cl/gow"),
            PriceQuote::new("zmart", 54990.0, "https://zmart.cl/gow"),
        ];
        store.apply_update(&ItemId::new("1"), prices.clone(), now).await.unwrap();

        let selected = store.selected().await.unwrap();
        assert_eq!(selected.prices, prices);
        assert_eq!(selected.last_update, Some(now));
    }

    #[tokio::test]
    async fn apply_update_replaces_rather_than_merges() {
        let store = CatalogStore::new();
        store.replace_all(catalog()).await;
        let id = ItemId::new("2");
        store
            .apply_update(&id, vec![PriceQuote::new("a", 1.0, "u"), PriceQuote::new("b", 2.0, "u")], Utc::now())
            .await
            .unwrap();
        store
            .apply_update(&id, vec![PriceQuote::new("c", 3.0, "u")], Utc::now())
            .await
            .unwrap();
        assert_eq!(store.get(&id).await.unwrap().prices, vec![PriceQuote::new("c", 3.0, "u")]);
    }

    #[tokio::test]
    async fn apply_update_unknown_id_is_not_found() {
        let store = CatalogStore::new();
        let err = store
            .apply_update(&ItemId::new("x"), Vec::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, TrackerError::NotFound(ItemId::new("x")));
    }
}
