// src/search/serper.rs
//! Serper (Google Search) client.

use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{SearchProvider, SearchResult};
use crate::error::{DigestError, DigestResult};

#[derive(Debug, Deserialize)]
struct SerperResponse {
    /// Absent or `null` both mean no results.
    #[serde(default)]
    organic: Option<Vec<SearchResult>>,
}

pub struct SerperClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SerperClient {
    pub fn new(
        api_key: String,
        endpoint: String,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> DigestResult<Self> {
        if api_key.trim().is_empty() {
            return Err(DigestError::Configuration("missing SERPER_API_KEY".into()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| DigestError::Configuration(format!("search http client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            endpoint,
        })
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str, limit: usize) -> DigestResult<Vec<SearchResult>> {
        if query.trim().is_empty() || limit == 0 {
            return Err(DigestError::SearchUnavailable(
                "query must be non-empty and limit > 0".into(),
            ));
        }

        let body = serde_json::json!({ "q": query });
        let resp = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DigestError::SearchUnavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            counter!("digest_search_rate_limited_total").increment(1);
            warn!(query, "serper rate limit exceeded");
            return Err(DigestError::RateLimited);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DigestError::SearchUnavailable(format!(
                "HTTP {status}: {}",
                text.trim()
            )));
        }

        let data: SerperResponse = resp
            .json()
            .await
            .map_err(|e| DigestError::SearchUnavailable(format!("bad response body: {e}")))?;

        let mut results = data.organic.unwrap_or_default();
        results.truncate(limit);
        debug!(query, count = results.len(), "serper search complete");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}
