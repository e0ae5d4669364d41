//! Search engine: classification, local scoring and delegation with fallback.
//!
//! # Flow
//! 1. Blank query: the full catalog, unranked, in catalog order
//! 2. Keyword query: local scoring
//! 3. Sentence-like query with a delegate configured: ask the delegate,
//!    falling back to local scoring when it fails, times out, answers with
//!    nothing usable, or another delegated call is still in flight
//!
//! Delegation failures never reach the caller.

use crate::catalog::ToolRecord;
use crate::delegate::{DelegationError, DelegationRequest, SearchDelegate};
use crate::search::classify::{classify, QueryKind};
use crate::search::keywords::KeywordTable;
use crate::search::scorer;
use crate::search::types::{RankedResult, SearchMode, SearchResults};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a delegated call.
pub const DEFAULT_DELEGATION_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SearchEngine {
    keywords: KeywordTable,
    delegate: Option<Arc<dyn SearchDelegate>>,
    delegation_timeout: Duration,
    /// Set while a delegated call is outstanding.
    busy: AtomicBool,
}

/// Clears the busy flag when the delegated call finishes or is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SearchEngine {
    /// A local-only engine using the given keyword-expansion table.
    pub fn new(keywords: KeywordTable) -> Self {
        Self {
            keywords,
            delegate: None,
            delegation_timeout: DEFAULT_DELEGATION_TIMEOUT,
            busy: AtomicBool::new(false),
        }
    }

    /// Enable delegation of sentence-like queries.
    pub fn with_delegate(mut self, delegate: Arc<dyn SearchDelegate>, timeout: Duration) -> Self {
        self.delegate = Some(delegate);
        self.delegation_timeout = timeout;
        self
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    pub fn delegation_enabled(&self) -> bool {
        self.delegate.is_some()
    }

    /// True while a delegated call is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Search without ever delegating.
    pub fn search_local(&self, query: &str, catalog: &[ToolRecord]) -> SearchResults {
        if query.trim().is_empty() {
            return show_all(catalog);
        }
        SearchResults {
            mode: SearchMode::Ranked,
            results: scorer::search_local(query, catalog, &self.keywords),
        }
    }

    /// Search the catalog, delegating sentence-like queries when possible.
    pub async fn search(&self, query: &str, catalog: &[ToolRecord]) -> SearchResults {
        let kind = classify(query);

        let delegate = match (kind, &self.delegate) {
            (QueryKind::Sentence, Some(delegate)) => delegate,
            _ => return self.search_local(query, catalog),
        };

        let Some(_guard) = self.try_acquire() else {
            tracing::debug!(query, "Delegated call already in flight, scoring locally");
            metrics::counter!("delegation_fallbacks_total", "reason" => "busy").increment(1);
            return self.search_local(query, catalog);
        };

        let start = std::time::Instant::now();
        match self.delegate_query(&**delegate, query, catalog).await {
            Ok(selected) if !selected.is_empty() => {
                tracing::info!(
                    query,
                    delegate = delegate.name(),
                    selected = selected.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Delegated search completed"
                );
                SearchResults {
                    mode: SearchMode::Delegated,
                    results: selected.into_iter().map(RankedResult::unranked).collect(),
                }
            }
            Ok(_) => {
                tracing::debug!(query, "Delegate returned no matches, scoring locally");
                metrics::counter!("delegation_fallbacks_total", "reason" => "empty").increment(1);
                self.search_local(query, catalog)
            }
            Err(e) => {
                tracing::warn!(
                    query,
                    delegate = delegate.name(),
                    error = %e,
                    "Delegated search failed, scoring locally"
                );
                metrics::counter!("delegation_fallbacks_total", "reason" => "error").increment(1);
                self.search_local(query, catalog)
            }
        }
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    async fn delegate_query(
        &self,
        delegate: &dyn SearchDelegate,
        query: &str,
        catalog: &[ToolRecord],
    ) -> Result<Vec<ToolRecord>, DelegationError> {
        let names = distinct_names(catalog);
        let request = DelegationRequest::new(query, &names);

        let response = tokio::time::timeout(self.delegation_timeout, delegate.select(&request))
            .await
            .map_err(|_| DelegationError::Timeout(self.delegation_timeout.as_millis() as u64))??;

        Ok(response.select(catalog))
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(KeywordTable::default())
    }
}

fn show_all(catalog: &[ToolRecord]) -> SearchResults {
    SearchResults {
        mode: SearchMode::All,
        results: catalog.iter().cloned().map(RankedResult::unranked).collect(),
    }
}

/// Record names in catalog order, first occurrence only.
fn distinct_names(catalog: &[ToolRecord]) -> Vec<&str> {
    let mut seen = HashSet::new();
    catalog
        .iter()
        .map(|tool| tool.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::DelegationResponse;
    use crate::BoxFuture;

    struct Canned(Vec<&'static str>);

    impl SearchDelegate for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn select(
            &self,
            _request: &DelegationRequest,
        ) -> BoxFuture<'_, Result<DelegationResponse, DelegationError>> {
            let relevant_tools = self.0.iter().map(|s| s.to_string()).collect();
            Box::pin(async move { Ok::<_, DelegationError>(DelegationResponse { relevant_tools }) })
        }
    }

    struct Failing;

    impl SearchDelegate for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn select(
            &self,
            _request: &DelegationRequest,
        ) -> BoxFuture<'_, Result<DelegationResponse, DelegationError>> {
            Box::pin(async {
                Err::<DelegationResponse, _>(DelegationError::Network("connection refused".into()))
            })
        }
    }

    struct Stalled;

    impl SearchDelegate for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        fn select(
            &self,
            _request: &DelegationRequest,
        ) -> BoxFuture<'_, Result<DelegationResponse, DelegationError>> {
            Box::pin(std::future::pending::<Result<DelegationResponse, DelegationError>>())
        }
    }

    fn catalog() -> Vec<ToolRecord> {
        vec![
            ToolRecord::new("MCStacker", "Generate custom commands"),
            ToolRecord::new("Chunkbase", "Find structures from a seed"),
            ToolRecord::new("Plotz", "Sphere and shape generator"),
        ]
    }

    const SENTENCE: &str = "find me a command generator";

    #[tokio::test]
    async fn test_empty_query_returns_everything() {
        let engine = SearchEngine::default();
        let results = engine.search("  ", &catalog()).await;

        assert_eq!(results.mode, SearchMode::All);
        assert_eq!(results.names(), vec!["MCStacker", "Chunkbase", "Plotz"]);
        assert!(results.results.iter().all(|r| r.relevance.is_none()));
        assert!(!results.is_no_match());
    }

    #[tokio::test]
    async fn test_keyword_query_never_delegates() {
        let engine = SearchEngine::default()
            .with_delegate(Arc::new(Canned(vec!["Plotz"])), DEFAULT_DELEGATION_TIMEOUT);
        let results = engine.search("seed", &catalog()).await;

        assert_eq!(results.mode, SearchMode::Ranked);
        assert_eq!(results.names(), vec!["Chunkbase"]);
    }

    #[tokio::test]
    async fn test_delegated_results_in_catalog_order() {
        let engine = SearchEngine::default().with_delegate(
            Arc::new(Canned(vec!["plotz", "mcstacker"])),
            DEFAULT_DELEGATION_TIMEOUT,
        );
        let results = engine.search(SENTENCE, &catalog()).await;

        assert_eq!(results.mode, SearchMode::Delegated);
        assert_eq!(results.names(), vec!["MCStacker", "Plotz"]);
        assert!(!engine.is_busy());
    }

    #[tokio::test]
    async fn test_empty_delegation_falls_back_to_local() {
        let engine = SearchEngine::default()
            .with_delegate(Arc::new(Canned(vec![])), DEFAULT_DELEGATION_TIMEOUT);
        let results = engine.search(SENTENCE, &catalog()).await;

        assert_eq!(results, engine.search_local(SENTENCE, &catalog()));
    }

    #[tokio::test]
    async fn test_unknown_names_fall_back_to_local() {
        let engine = SearchEngine::default()
            .with_delegate(Arc::new(Canned(vec!["Nope"])), DEFAULT_DELEGATION_TIMEOUT);
        let results = engine.search(SENTENCE, &catalog()).await;

        assert_eq!(results.mode, SearchMode::Ranked);
    }

    #[tokio::test]
    async fn test_failed_delegation_falls_back_to_local() {
        let engine =
            SearchEngine::default().with_delegate(Arc::new(Failing), DEFAULT_DELEGATION_TIMEOUT);
        let results = engine.search(SENTENCE, &catalog()).await;

        assert_eq!(results, engine.search_local(SENTENCE, &catalog()));
        assert!(!engine.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_delegation_times_out() {
        let engine =
            SearchEngine::default().with_delegate(Arc::new(Stalled), Duration::from_millis(250));
        let results = engine.search(SENTENCE, &catalog()).await;

        assert_eq!(results.mode, SearchMode::Ranked);
        assert!(!engine.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_delegation() {
        let engine = Arc::new(
            SearchEngine::default().with_delegate(Arc::new(Stalled), Duration::from_secs(10)),
        );
        let cat = Arc::new(catalog());

        let first = {
            let engine = Arc::clone(&engine);
            let cat = Arc::clone(&cat);
            tokio::spawn(async move { engine.search(SENTENCE, &cat).await })
        };
        while !engine.is_busy() {
            tokio::task::yield_now().await;
        }

        // second sentence-like query does not start another call
        let second = engine.search(SENTENCE, &cat).await;
        assert_eq!(second.mode, SearchMode::Ranked);
        assert!(engine.is_busy());

        let first = first.await.unwrap();
        assert_eq!(first.mode, SearchMode::Ranked);
        assert!(!engine.is_busy());
    }

    #[test]
    fn test_distinct_names() {
        let mut cat = catalog();
        cat.push(ToolRecord::new("Plotz", "duplicate"));
        assert_eq!(distinct_names(&cat), vec!["MCStacker", "Chunkbase", "Plotz"]);
    }
}
