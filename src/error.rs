//! Error taxonomy shared by the search, generation and aggregation layers.

use thiserror::Error;

pub type DigestResult<T> = Result<T, DigestError>;

#[derive(Debug, Error)]
pub enum DigestError {
    /// Search provider answered HTTP 429.
    #[error("search provider rate limit exceeded")]
    RateLimited,

    /// Any other search failure (transport, non-success status, bad body).
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    /// Generation backend failed or returned nothing usable.
    #[error("summarization failed: {0}")]
    SummarizationFailed(String),

    /// Missing or invalid credential / endpoint / tuning value.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DigestError {
    /// Throttling and search transport failures are worth another attempt;
    /// generation and configuration failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::SearchUnavailable(_))
    }
}
