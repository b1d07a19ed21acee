//! Async driver for the search screen.
//!
//! [`SearchController`] owns the current [`SearchState`], feeds messages
//! through [`update`], and carries out the returned [`Command`]s. Each fetch
//! runs as its own tokio task that reports back over a channel; starting a
//! new lineage aborts the task of the previous one so a superseded retry
//! never reaches the endpoint.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use covisearch_core::SearchFilter;

use crate::client::{FetchOutcome, LeadSearchClient};
use crate::error::SearchError;
use crate::state::{update, Command, Msg, RetryPolicy, ScreenStatus, SearchQuery, SearchState};

/// Source of result pages. Implemented by [`LeadSearchClient`]; tests
/// substitute scripted fetchers.
pub trait LeadFetcher: Send + Sync + 'static {
    fn fetch_page(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<FetchOutcome, SearchError>> + Send;
}

impl LeadFetcher for LeadSearchClient {
    fn fetch_page(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<FetchOutcome, SearchError>> + Send {
        LeadSearchClient::fetch_page(self, query)
    }
}

pub struct SearchController<F> {
    fetcher: Arc<F>,
    policy: RetryPolicy,
    state: SearchState,
    events_tx: UnboundedSender<Msg>,
    events_rx: UnboundedReceiver<Msg>,
    /// Task of the current lineage, tagged with that lineage.
    in_flight: Option<(u64, JoinHandle<()>)>,
    scroll_requested: bool,
}

impl<F: LeadFetcher> SearchController<F> {
    #[must_use]
    pub fn new(fetcher: Arc<F>, policy: RetryPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            policy,
            state: SearchState::default(),
            events_tx,
            events_rx,
            in_flight: None,
            scroll_requested: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Returns `true` once after each successful fetch.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    /// Applies `msg` and starts whatever work it calls for without waiting
    /// on the result.
    pub fn dispatch(&mut self, msg: Msg) {
        let previous_lineage = self.state.lineage;
        let transition = update(&self.state, msg, self.policy);
        let changed = transition.state != self.state;

        if transition.state.lineage != previous_lineage {
            if let Some((_, handle)) = self.in_flight.take() {
                handle.abort();
            }
        }
        self.state = transition.state;
        if changed {
            self.log_status();
        }

        match transition.command {
            Some(Command::Fetch {
                lineage,
                query,
                delay,
            }) => {
                let fetcher = Arc::clone(&self.fetcher);
                let tx = self.events_tx.clone();
                let handle = tokio::spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let outcome = fetcher.fetch_page(&query).await;
                    // The receiver lives as long as the controller.
                    let _ = tx.send(Msg::Completed { lineage, outcome });
                });
                self.in_flight = Some((lineage, handle));
            }
            Some(Command::ScrollToTop) => self.scroll_requested = true,
            None => {}
        }
    }

    /// Waits for the next fetch completion and applies it.
    ///
    /// A fetch task that dies without reporting (a panic) completes its
    /// lineage with [`SearchError::TaskFailed`]. Returns `false` without
    /// waiting when nothing is outstanding.
    pub async fn step(&mut self) -> bool {
        if !self.state.status.is_busy() {
            return false;
        }

        let event = match self.in_flight.as_mut() {
            Some((_, handle)) => tokio::select! {
                // A finished task has already queued its message.
                biased;
                msg = self.events_rx.recv() => Event::Message(msg),
                joined = handle => Event::TaskEnded(joined),
            },
            None => Event::Message(self.events_rx.recv().await),
        };

        match event {
            Event::Message(Some(msg)) => self.dispatch(msg),
            Event::Message(None) => return false,
            Event::TaskEnded(joined) => {
                let Some((lineage, _)) = self.in_flight.take() else {
                    return false;
                };
                match joined {
                    Ok(()) => {}
                    Err(err) if err.is_cancelled() => {}
                    Err(err) => {
                        tracing::error!(lineage, error = %err, "fetch task failed");
                        self.dispatch(Msg::Completed {
                            lineage,
                            outcome: Err(SearchError::TaskFailed(err.to_string())),
                        });
                    }
                }
            }
        }
        true
    }

    /// Drives the current lineage to a terminal status.
    pub async fn settle(&mut self) -> &SearchState {
        while self.step().await {}
        &self.state
    }

    pub async fn submit(&mut self, filter: SearchFilter) -> &SearchState {
        self.dispatch(Msg::Submit(filter));
        self.settle().await
    }

    pub async fn fetch_next_batch(&mut self) -> &SearchState {
        self.dispatch(Msg::NextBatch);
        self.settle().await
    }

    pub async fn fetch_previous_batch(&mut self) -> &SearchState {
        self.dispatch(Msg::PreviousBatch);
        self.settle().await
    }

    fn log_status(&self) {
        let state = &self.state;
        match state.status {
            ScreenStatus::Loading => tracing::info!(
                lineage = state.lineage,
                page = state.page_number,
                "fetching leads"
            ),
            ScreenStatus::FetchingData => tracing::debug!(
                lineage = state.lineage,
                retries_left = state.retries_left,
                delay_ms = u64::try_from(self.policy.retry_delay.as_millis()).unwrap_or(u64::MAX),
                "results still aggregating, polling again"
            ),
            ScreenStatus::DataFetched => tracing::info!(
                lineage = state.lineage,
                leads = state.result.leads.len(),
                more = state.result.has_more_data,
                "leads fetched"
            ),
            ScreenStatus::Timeout => tracing::warn!(
                lineage = state.lineage,
                max_retries = self.policy.max_retries,
                "gave up waiting for results"
            ),
            ScreenStatus::Error => tracing::warn!(
                lineage = state.lineage,
                error = state.error.as_deref().unwrap_or_default(),
                "search failed"
            ),
            ScreenStatus::Idle => {}
        }
    }
}

enum Event {
    Message(Option<Msg>),
    TaskEnded(Result<(), tokio::task::JoinError>),
}

impl<F> Drop for SearchController<F> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
