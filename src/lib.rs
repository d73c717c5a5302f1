pub mod api;
pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod coordinator;
pub mod dashboard; // Session state shared by the CLI commands
pub mod error;
pub mod presentation;
pub mod utils;

pub use api::{HttpBackend, PriceBackend};
pub use catalog::{CatalogStore, Item, ItemId, PriceQuote};
pub use cooldown::{CooldownRegistry, CooldownTicker, ManualClock, SystemClock, TimeSource};
pub use coordinator::{RefreshReport, RefreshState, UpdateCoordinator};
pub use dashboard::Dashboard;
pub use error::{Result, TrackerError};
