//! Load-once, read-many holder for the tool catalog.
//!
//! The store is the only writer of the catalog. A load either replaces the
//! whole sequence or leaves it empty with a `Failed` status, so callers can
//! tell "the catalog failed to load" apart from "the query matched nothing".

use crate::catalog::types::ToolRecord;
use crate::config::CatalogSource;
use crate::error::{AppError, Result};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Shared, immutable view of the loaded catalog.
pub type Catalog = Arc<Vec<ToolRecord>>;

/// Upper bound on fetching a remote catalog.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of the most recent load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStatus {
    NotLoaded,
    Loaded,
    Failed,
}

struct Snapshot {
    status: CatalogStatus,
    tools: Catalog,
}

pub struct CatalogStore {
    inner: RwLock<Snapshot>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// An empty store that has not attempted a load yet.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                status: CatalogStatus::NotLoaded,
                tools: Arc::new(Vec::new()),
            }),
        }
    }

    /// A store already holding `records`, used for fixtures and embedding.
    pub fn from_records(records: Vec<ToolRecord>) -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                status: CatalogStatus::Loaded,
                tools: Arc::new(records),
            }),
        }
    }

    /// Fetch and parse the catalog, replacing whatever was held before.
    ///
    /// # Errors
    /// Returns `AppError::CatalogLoad` on I/O or transport errors, non-success
    /// HTTP status, or malformed JSON. The store is then left empty with
    /// status `Failed`.
    pub async fn load(&self, source: &CatalogSource) -> Result<Catalog> {
        let start = std::time::Instant::now();

        let outcome = match fetch_catalog(source).await {
            Ok(bytes) => parse_catalog(&bytes),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(records) => {
                let tools: Catalog = Arc::new(records);
                self.replace(CatalogStatus::Loaded, Arc::clone(&tools));
                tracing::info!(
                    source = %source,
                    count = tools.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Catalog loaded"
                );
                Ok(tools)
            }
            Err(e) => {
                self.replace(CatalogStatus::Failed, Arc::new(Vec::new()));
                tracing::error!(source = %source, error = %e, "Catalog load failed");
                Err(e)
            }
        }
    }

    /// Current catalog. Empty unless a load succeeded.
    pub fn all(&self) -> Catalog {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard.tools)
    }

    pub fn status(&self) -> CatalogStatus {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == CatalogStatus::Loaded
    }

    fn replace(&self, status: CatalogStatus, tools: Catalog) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Snapshot { status, tools };
    }
}

/// Read the raw catalog document from disk or over HTTP.
async fn fetch_catalog(source: &CatalogSource) -> Result<Vec<u8>> {
    match source {
        CatalogSource::File(path) => tokio::fs::read(path).await.map_err(|e| {
            AppError::CatalogLoad(format!("failed to read {}: {}", path.display(), e))
        }),
        CatalogSource::Url(url) => {
            let client = reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .map_err(|e| AppError::CatalogLoad(format!("HTTP client error: {}", e)))?;

            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| AppError::CatalogLoad(format!("request to {} failed: {}", url, e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::CatalogLoad(format!(
                    "HTTP error! status: {}",
                    status.as_u16()
                )));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| AppError::CatalogLoad(format!("failed to read body: {}", e)))?;
            Ok(body.to_vec())
        }
    }
}

/// Parse a catalog document: a JSON array of tool records.
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<ToolRecord>> {
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::CatalogLoad(format!("malformed catalog JSON: {}", e)))
}
