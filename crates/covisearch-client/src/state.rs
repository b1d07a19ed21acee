//! Search screen state and its transition function.
//!
//! [`update`] is pure: it takes the current [`SearchState`] and a [`Msg`]
//! and returns the next state plus at most one [`Command`] for the driver
//! to carry out. All timing and I/O live in [`crate::controller`].
//!
//! Status flow for one lineage:
//!
//! ```text
//! Loading ──202──▶ FetchingData ──202──▶ ... ──budget spent──▶ Timeout
//!    │                  │
//!    ├──ok──────────────┴──ok──▶ DataFetched
//!    └──error───────────┴──error──▶ Error
//! ```
//!
//! A lineage is every attempt made for one submit or page change. Each new
//! lineage gets a fresh id; completions tagged with an older id are dropped.

use std::time::Duration;

use covisearch_core::{AppConfig, SearchFilter, SearchResult};

use crate::client::FetchOutcome;
use crate::error::SearchError;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2_000);

/// How pending (HTTP 202) pages are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-polls allowed per lineage after the first attempt.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScreenStatus {
    /// Nothing searched yet.
    #[default]
    Idle,
    Loading,
    /// The endpoint answered 202 and a re-poll is scheduled.
    FetchingData,
    DataFetched,
    /// Retry budget spent while the endpoint kept answering 202.
    Timeout,
    Error,
}

impl ScreenStatus {
    /// True while a fetch or a scheduled re-poll is outstanding.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, ScreenStatus::Loading | ScreenStatus::FetchingData)
    }
}

impl std::fmt::Display for ScreenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenStatus::Idle => write!(f, "idle"),
            ScreenStatus::Loading => write!(f, "loading"),
            ScreenStatus::FetchingData => write!(f, "fetching data"),
            ScreenStatus::DataFetched => write!(f, "data fetched"),
            ScreenStatus::Timeout => write!(f, "timeout"),
            ScreenStatus::Error => write!(f, "error"),
        }
    }
}

/// Parameters of a single request. Fixed for the life of a lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub resource_value: String,
    pub city: String,
    pub page_number: u32,
}

impl SearchQuery {
    /// Builds the query for `page_number` of `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] if the city is blank or a
    /// category group has no subcategory, or one that is not its own, chosen.
    pub fn for_page(filter: &SearchFilter, page_number: u32) -> Result<Self, SearchError> {
        let city = filter.city.trim();
        if city.is_empty() {
            return Err(SearchError::InvalidFilter("no city selected".to_owned()));
        }
        let resource_value = filter.query_value().ok_or_else(|| {
            let parent = &filter.resource.display_name;
            SearchError::InvalidFilter(match &filter.subresource {
                Some(sub) => format!("'{}' is not a subcategory of '{parent}'", sub.display_name),
                None => format!("choose a subcategory of '{parent}'"),
            })
        })?;
        Ok(Self {
            resource_value: resource_value.to_owned(),
            city: city.to_owned(),
            page_number,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Filter committed by the last submit.
    pub filter: Option<SearchFilter>,
    /// Query of the current lineage.
    pub query: Option<SearchQuery>,
    pub page_number: u32,
    pub retries_left: u32,
    pub status: ScreenStatus,
    pub result: SearchResult,
    pub error: Option<String>,
    pub lineage: u64,
}

impl SearchState {
    #[must_use]
    pub fn can_fetch_next(&self) -> bool {
        !self.status.is_busy()
            && self.filter.is_some()
            && (self.result.has_more_data || self.page_number == 0)
    }

    #[must_use]
    pub fn can_fetch_previous(&self) -> bool {
        !self.status.is_busy() && self.filter.is_some() && self.page_number > 1
    }
}

#[derive(Debug)]
pub enum Msg {
    Submit(SearchFilter),
    NextBatch,
    PreviousBatch,
    Completed {
        lineage: u64,
        outcome: Result<FetchOutcome, SearchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Wait `delay`, then request `query` and report back tagged with `lineage`.
    Fetch {
        lineage: u64,
        query: SearchQuery,
        delay: Duration,
    },
    /// Fresh results are in; show them from the top.
    ScrollToTop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SearchState,
    pub command: Option<Command>,
}

impl Transition {
    fn unchanged(state: &SearchState) -> Self {
        Self {
            state: state.clone(),
            command: None,
        }
    }
}

#[must_use]
pub fn update(state: &SearchState, msg: Msg, policy: RetryPolicy) -> Transition {
    match msg {
        Msg::Submit(filter) => submit(state, filter, policy),
        Msg::NextBatch => {
            if state.can_fetch_next() {
                change_page(state, state.page_number + 1, state.lineage + 1, policy)
            } else {
                Transition::unchanged(state)
            }
        }
        Msg::PreviousBatch => {
            if state.can_fetch_previous() {
                change_page(state, state.page_number - 1, state.lineage + 1, policy)
            } else {
                Transition::unchanged(state)
            }
        }
        Msg::Completed { lineage, outcome } => {
            if lineage != state.lineage || !state.status.is_busy() {
                return Transition::unchanged(state);
            }
            completed(state, outcome, policy)
        }
    }
}

fn submit(state: &SearchState, filter: SearchFilter, policy: RetryPolicy) -> Transition {
    // Every submit supersedes whatever was in flight, valid or not.
    let lineage = state.lineage + 1;

    if let Err(err) = SearchQuery::for_page(&filter, 1) {
        return Transition {
            state: SearchState {
                filter: None,
                query: None,
                page_number: 0,
                retries_left: 0,
                status: ScreenStatus::Error,
                result: SearchResult::default(),
                error: Some(err.display_payload()),
                lineage,
            },
            command: None,
        };
    }

    let reset = SearchState {
        filter: Some(filter),
        query: None,
        page_number: 0,
        retries_left: policy.max_retries,
        status: ScreenStatus::Idle,
        result: SearchResult::default(),
        error: None,
        lineage,
    };
    // The first page goes out through the same path as "next".
    change_page(&reset, 1, lineage, policy)
}

fn change_page(
    state: &SearchState,
    page_number: u32,
    lineage: u64,
    policy: RetryPolicy,
) -> Transition {
    let Some(filter) = state.filter.as_ref() else {
        return Transition::unchanged(state);
    };
    let Ok(query) = SearchQuery::for_page(filter, page_number) else {
        return Transition::unchanged(state);
    };

    let next = SearchState {
        filter: state.filter.clone(),
        query: Some(query.clone()),
        page_number,
        retries_left: policy.max_retries,
        status: ScreenStatus::Loading,
        result: SearchResult::default(),
        error: None,
        lineage,
    };
    Transition {
        state: next,
        command: Some(Command::Fetch {
            lineage,
            query,
            delay: Duration::ZERO,
        }),
    }
}

fn completed(
    state: &SearchState,
    outcome: Result<FetchOutcome, SearchError>,
    policy: RetryPolicy,
) -> Transition {
    let mut next = state.clone();
    next.result = SearchResult::default();

    match outcome {
        Err(err) => {
            next.status = ScreenStatus::Error;
            next.error = Some(err.display_payload());
            Transition {
                state: next,
                command: None,
            }
        }
        Ok(FetchOutcome::Pending) => {
            let Some(query) = state.query.clone() else {
                next.status = ScreenStatus::Error;
                next.error = Some("no active query to retry".to_owned());
                return Transition {
                    state: next,
                    command: None,
                };
            };
            if state.retries_left == 0 {
                next.status = ScreenStatus::Timeout;
                return Transition {
                    state: next,
                    command: None,
                };
            }
            next.retries_left = state.retries_left - 1;
            next.status = ScreenStatus::FetchingData;
            Transition {
                state: next,
                command: Some(Command::Fetch {
                    lineage: state.lineage,
                    query,
                    delay: policy.retry_delay,
                }),
            }
        }
        Ok(FetchOutcome::Ready(result)) => {
            next.result = result;
            next.status = ScreenStatus::DataFetched;
            Transition {
                state: next,
                command: Some(Command::ScrollToTop),
            }
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
