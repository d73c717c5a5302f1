pub mod models;
pub mod store;

pub use models::{Item, ItemId, PriceQuote};
pub use store::CatalogStore;
