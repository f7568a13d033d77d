// src/search/mod.rs
//! Web search: provider abstraction, the Serper client, query builders and a
//! scriptable in-process provider.

pub mod mock;
pub mod query;
pub mod serper;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DigestResult;

pub use mock::MockSearch;
pub use serper::SerperClient;

/// One organic search hit. Every field may be missing in the provider body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SearchResult {
    pub fn new(title: &str, snippet: &str, link: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            snippet: Some(snippet.to_string()),
            link: Some(link.to_string()),
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Top organic results in provider order, at most `limit` of them.
    ///
    /// Fails with `RateLimited` on provider throttling and
    /// `SearchUnavailable` on any other failure.
    async fn search(&self, query: &str, limit: usize) -> DigestResult<Vec<SearchResult>>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}
