//! Toolfinder - tool directory search
//!
//! This library exposes the catalog store, the relevance-scoring search
//! engine with optional language-model delegation, and the query controller,
//! enabling integration tests and embedding in other front-ends.

use std::future::Future;
use std::pin::Pin;

pub mod catalog;
pub mod config;
pub mod controller;
pub mod delegate;
pub mod error;
pub mod handlers;
pub mod search;
pub mod state;

/// Boxed future used by object-safe async traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// Re-export key types for convenience
pub use catalog::{Catalog, CatalogStatus, CatalogStore, PriceTier, ToolLink, ToolRecord};
pub use config::{CatalogSource, Config};
pub use controller::{ResultView, SearchController};
pub use delegate::{DelegationError, DelegationRequest, DelegationResponse, SearchDelegate};
pub use error::{AppError, Result};
pub use handlers::{health_handler, ready_handler, search_handler, suggest_handler, tools_handler};
pub use search::{KeywordTable, RankedResult, SearchEngine, SearchMode, SearchResults};
pub use state::AppState;
