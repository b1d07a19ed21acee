use thiserror::Error;

/// Errors returned by the lead search client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The filter cannot be turned into a query (no city, or a category
    /// group without a chosen subcategory).
    #[error("incomplete search filter: {0}")]
    InvalidFilter(String),

    /// The task running a fetch ended without reporting a result.
    #[error("fetch task failed: {0}")]
    TaskFailed(String),
}

impl SearchError {
    /// Text shown to the user when a search fails.
    ///
    /// Server errors surface their response body when it has one, since
    /// that is where the endpoint explains what went wrong.
    #[must_use]
    pub fn display_payload(&self) -> String {
        match self {
            SearchError::UnexpectedStatus { status, body } if body.trim().is_empty() => {
                format!("server returned HTTP {status}")
            }
            SearchError::UnexpectedStatus { body, .. } => body.trim().to_owned(),
            other => other.to_string(),
        }
    }
}
