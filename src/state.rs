use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::delegate::OpenAiDelegate;
use crate::error::Result;
use crate::search::{KeywordTable, SearchEngine, DEFAULT_MAX_SUGGESTIONS};
use std::sync::Arc;

/// Application state shared across all request handlers.
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub engine: Arc<SearchEngine>,
    pub max_suggestions: usize,
}

impl AppState {
    /// Build state from configuration and load the catalog.
    ///
    /// A catalog load failure is not fatal: the service starts with an empty
    /// catalog, `/ready` reports not ready, and searches answer 503 so the
    /// front-end can show "failed to load" instead of "no matches".
    /// A broken keyword table is fatal.
    pub async fn new(config: Config) -> Result<Self> {
        let keywords = match &config.keywords_path {
            Some(path) => {
                let table = KeywordTable::from_json_file(path)?;
                tracing::info!(path = %path.display(), entries = table.len(), "Keyword table loaded");
                table
            }
            None => KeywordTable::default(),
        };

        let mut engine = SearchEngine::new(keywords);
        if let Some(delegation) = &config.delegation {
            tracing::info!(
                model = %delegation.model,
                timeout_ms = delegation.timeout.as_millis() as u64,
                "Delegated search enabled"
            );
            engine = engine.with_delegate(
                Arc::new(OpenAiDelegate::from_config(delegation)),
                delegation.timeout,
            );
        }

        let store = CatalogStore::new();
        if let Err(e) = store.load(&config.catalog_source).await {
            tracing::warn!(error = %e, "Starting with an empty catalog");
        }

        Ok(Self {
            store: Arc::new(store),
            engine: Arc::new(engine),
            max_suggestions: config.max_suggestions,
        })
    }

    /// State over an already-built store and engine.
    pub fn from_parts(store: CatalogStore, engine: SearchEngine) -> Self {
        Self {
            store: Arc::new(store),
            engine: Arc::new(engine),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.store.is_loaded()
    }
}
