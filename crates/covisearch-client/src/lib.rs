//! HTTP client and search-screen controller for the CoviSearch lead
//! aggregation endpoint.

pub mod client;
pub mod controller;
pub mod error;
pub mod state;

pub use client::{FetchOutcome, LeadSearchClient};
pub use controller::{LeadFetcher, SearchController};
pub use error::SearchError;
pub use state::{
    update, Command, Msg, RetryPolicy, ScreenStatus, SearchQuery, SearchState, Transition,
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY,
};
