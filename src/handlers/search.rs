//! Search handlers for the tool directory.
//!
//! `POST /search` runs the engine (local scoring, or delegation for
//! sentence-like queries), `GET /tools` lists the whole catalog and
//! `GET /suggest` feeds autocomplete. All of them answer 503 while the
//! catalog is not loaded so a client can tell a failed load from a query that
//! matched nothing.

use crate::catalog::{PriceTier, ToolLink, ToolRecord};
use crate::error::{AppError, Result};
use crate::search::{suggest, RankedResult, SearchMode, SearchResults};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest accepted query, in characters.
const MAX_QUERY_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free-text query; blank means "show everything"
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub mode: SearchMode,
    pub total: usize,
    pub results: Vec<ToolView>,
}

/// One tool as returned to clients.
#[derive(Debug, Serialize)]
pub struct ToolView {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub price: String,
    pub price_tier: PriceTier,
    pub links: Vec<ToolLink>,
    /// Local relevance score; absent for unranked result sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u32>,
}

impl From<RankedResult> for ToolView {
    fn from(result: RankedResult) -> Self {
        let RankedResult { record, relevance } = result;
        let price_tier = record.price_tier();
        let ToolRecord {
            name,
            description,
            keywords,
            price,
            links,
        } = record;

        Self {
            name,
            description,
            keywords,
            price,
            price_tier,
            links,
            relevance,
        }
    }
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            mode: results.mode,
            total: results.len(),
            results: results.results.into_iter().map(ToolView::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

fn ensure_loaded(state: &AppState) -> Result<()> {
    if state.store.is_loaded() {
        Ok(())
    } else {
        Err(AppError::CatalogUnavailable(
            "catalog failed to load; check CATALOG_SOURCE".to_string(),
        ))
    }
}

/// POST /search - Find tools matching a free-text query.
///
/// # Flow
/// 1. Validate: catalog loaded, query not too long
/// 2. Blank query: whole catalog, unranked
/// 3. Keyword query: local relevance scoring, best first
/// 4. Sentence-like query: delegated selection, falling back to local scoring
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start_time = std::time::Instant::now();

    ensure_loaded(&state)?;

    if request.query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::ValidationError(format!(
            "Query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let catalog = state.store.all();
    let results = state.engine.search(&request.query, &catalog).await;

    let total_time = start_time.elapsed();
    tracing::info!(
        query = %request.query,
        mode = ?results.mode,
        matched = results.len(),
        total_ms = total_time.as_millis() as u64,
        "Search completed"
    );

    let mode = match results.mode {
        SearchMode::All => "all",
        SearchMode::Ranked => "ranked",
        SearchMode::Delegated => "delegated",
    };
    metrics::counter!("search_requests_total", "mode" => mode).increment(1);
    metrics::histogram!("search_latency_ms").record(total_time.as_millis() as f64);

    Ok(Json(results.into()))
}

/// GET /tools - The whole catalog in file order.
pub async fn tools_handler(State(state): State<Arc<AppState>>) -> Result<Json<SearchResponse>> {
    ensure_loaded(&state)?;

    let catalog = state.store.all();
    let results = state.engine.search_local("", &catalog);

    Ok(Json(results.into()))
}

/// GET /suggest?q= - Autocomplete names for a partial query.
pub async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestResponse>> {
    ensure_loaded(&state)?;

    let catalog = state.store.all();
    let suggestions = suggest(&params.q, &catalog, state.max_suggestions);

    tracing::debug!(query = %params.q, count = suggestions.len(), "Suggestions computed");
    metrics::counter!("suggest_requests_total").increment(1);

    Ok(Json(SuggestResponse { suggestions }))
}
