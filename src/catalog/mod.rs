//! Catalog module: tool records and the load-once store that owns them.

pub mod store;
pub mod types;

pub use store::{parse_catalog, Catalog, CatalogStatus, CatalogStore};
pub use types::{PriceTier, ToolLink, ToolRecord};
