//! HTTP client for the lead aggregation endpoint.
//!
//! Wraps `reqwest` with the endpoint's one quirk: HTTP 202 is not a success
//! with a body but a "still aggregating, ask again" signal, surfaced as
//! [`FetchOutcome::Pending`].

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use covisearch_core::{AppConfig, SearchResponse, SearchResult};

use crate::error::SearchError;
use crate::state::SearchQuery;

/// What one request to the endpoint produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 202: aggregation for this query has not finished.
    Pending,
    Ready(SearchResult),
}

/// Client for the lead aggregation endpoint.
///
/// Use [`LeadSearchClient::from_config`] in the application or
/// [`LeadSearchClient::new`] to point at a mock server in tests.
pub struct LeadSearchClient {
    client: Client,
    base_url: Url,
}

impl LeadSearchClient {
    /// Creates a client for the endpoint at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Older deployments configured the endpoint with a dangling '?'.
        let trimmed = base_url.trim().trim_end_matches('?');
        let base_url = Url::parse(trimmed).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`LeadSearchClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Requests one page of leads.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::UnexpectedStatus`] on any non-2xx status.
    /// - [`SearchError::Deserialize`] if a success body does not match the
    ///   expected shape.
    pub async fn fetch_page(&self, query: &SearchQuery) -> Result<FetchOutcome, SearchError> {
        let url = self.build_url(query);
        tracing::debug!(%url, "requesting leads");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::ACCEPTED {
            return Ok(FetchOutcome::Pending);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        Ok(FetchOutcome::Ready(parsed.into()))
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("resource_type", &query.resource_value);
            pairs.append_pair("city", &query.city);
            pairs.append_pair("page_no", &query.page_number.to_string());
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
