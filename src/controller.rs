//! Search controller: turns a stream of query-change events into the visible
//! result set.
//!
//! Events arrive over a single channel. Non-empty queries are debounced; a
//! blank query is applied immediately. Every issued search is tagged with a
//! sequence number and its result is published only if no newer search has
//! been issued since, so a slow delegated call can never overwrite the result
//! of a query typed after it.

use crate::catalog::CatalogStore;
use crate::search::{SearchEngine, SearchResults};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default quiet period before a typed query is searched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// What the front-end should currently display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    /// No query has been applied yet.
    Idle,
    /// The catalog failed to load (or never loaded); distinct from no match.
    CatalogUnavailable { seq: u64 },
    /// Result of the most recently issued search.
    Showing {
        seq: u64,
        query: String,
        results: SearchResults,
    },
}

impl ResultView {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Idle => 0,
            Self::CatalogUnavailable { seq } | Self::Showing { seq, .. } => *seq,
        }
    }
}

struct Completed {
    seq: u64,
    query: String,
    results: SearchResults,
}

pub struct SearchController {
    events: mpsc::UnboundedSender<String>,
    view: watch::Receiver<ResultView>,
    task: JoinHandle<()>,
}

impl SearchController {
    /// Start the controller task on the current tokio runtime.
    pub fn spawn(store: Arc<CatalogStore>, engine: Arc<SearchEngine>, debounce: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(ResultView::Idle);

        let task = tokio::spawn(run(events_rx, view_tx, store, engine, debounce));

        Self {
            events: events_tx,
            view: view_rx,
            task,
        }
    }

    /// Report that the query text changed. Returns `false` once the
    /// controller has stopped.
    pub fn submit(&self, query: impl Into<String>) -> bool {
        self.events.send(query.into()).is_ok()
    }

    /// Snapshot of the visible result set.
    pub fn current(&self) -> ResultView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every applied result.
    pub fn subscribe(&self) -> watch::Receiver<ResultView> {
        self.view.clone()
    }

    /// Stop accepting events and wait for the task to exit. Searches still in
    /// flight are abandoned.
    pub async fn shutdown(self) {
        drop(self.events);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Search controller task ended abnormally");
        }
    }
}

async fn run(
    mut events: mpsc::UnboundedReceiver<String>,
    view: watch::Sender<ResultView>,
    store: Arc<CatalogStore>,
    engine: Arc<SearchEngine>,
    debounce: Duration,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed>();
    let mut latest: u64 = 0;
    let mut pending: Option<String> = None;

    let deadline = tokio::time::sleep(debounce);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(query) = event else { break };

                if query.trim().is_empty() {
                    // show-all is immediate and supersedes anything in flight
                    pending = None;
                    latest += 1;
                    if store.is_loaded() {
                        let results = engine.search_local(&query, &store.all());
                        view.send_replace(ResultView::Showing { seq: latest, query, results });
                    } else {
                        view.send_replace(ResultView::CatalogUnavailable { seq: latest });
                    }
                } else {
                    pending = Some(query);
                    deadline.as_mut().reset(Instant::now() + debounce);
                }
            }
            () = &mut deadline, if pending.is_some() => {
                let Some(query) = pending.take() else { continue };
                latest += 1;

                if !store.is_loaded() {
                    view.send_replace(ResultView::CatalogUnavailable { seq: latest });
                    continue;
                }

                tracing::debug!(seq = latest, query = %query, "Issuing search");
                let seq = latest;
                let engine = Arc::clone(&engine);
                let catalog = store.all();
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let results = engine.search(&query, &catalog).await;
                    let _ = done_tx.send(Completed { seq, query, results });
                });
            }
            Some(done) = done_rx.recv() => {
                if done.seq == latest {
                    metrics::counter!("controller_results_applied_total").increment(1);
                    view.send_replace(ResultView::Showing {
                        seq: done.seq,
                        query: done.query,
                        results: done.results,
                    });
                } else {
                    tracing::debug!(
                        seq = done.seq,
                        latest,
                        query = %done.query,
                        "Discarding stale search result"
                    );
                    metrics::counter!("controller_stale_results_total").increment(1);
                }
            }
        }
    }

    tracing::debug!(issued = latest, "Search controller stopped");
}
