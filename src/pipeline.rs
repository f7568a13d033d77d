//! Request-scoped digest pipeline: topics + source mode -> aggregators
//! (concurrently) -> broadcast compiler -> script.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::aggregate::{AggregateResult, AnalysisKind, DiscussionAggregator, NewsAggregator};
use crate::broadcast::compile_broadcast;
use crate::config::{DigestConfig, Tuning};
use crate::error::{DigestError, DigestResult};
use crate::generation::{build_backend, SharedBackend};
use crate::rate::SharedRateGate;
use crate::retry::RetryPolicy;
use crate::search::{MockSearch, SearchProvider, SerperClient};

/// Which sources feed the broadcast. `reddit` is accepted for `discussion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    News,
    #[serde(alias = "reddit")]
    Discussion,
    #[default]
    Both,
}

impl SourceMode {
    pub fn includes_news(&self) -> bool {
        matches!(self, Self::News | Self::Both)
    }

    pub fn includes_discussion(&self) -> bool {
        matches!(self, Self::Discussion | Self::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Discussion => "discussion",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rejected before any aggregator ran.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The broadcast step (or anything else request-wide) failed.
    #[error(transparent)]
    Failed(#[from] DigestError),
}

/// Trim topics, drop duplicates (first occurrence wins), reject blanks.
/// `max_topics` of 0 accepts any non-empty list.
pub fn normalize_topics(raw: &[String], max_topics: usize) -> Result<Vec<String>, PipelineError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for t in raw {
        let t = t.trim();
        if t.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "topics must not be blank".into(),
            ));
        }
        if !out.iter().any(|seen| seen == t) {
            out.push(t.to_string());
        }
    }
    if out.is_empty() {
        return Err(PipelineError::InvalidRequest(
            "at least one topic is required".into(),
        ));
    }
    if max_topics > 0 && out.len() > max_topics {
        return Err(PipelineError::InvalidRequest(format!(
            "at most {max_topics} topics per request"
        )));
    }
    Ok(out)
}

pub struct DigestService {
    news: NewsAggregator,
    discussion: DiscussionAggregator,
    backend: SharedBackend,
    max_topics: usize,
}

impl DigestService {
    /// Assemble from explicit parts. `gate` must be the process-wide gate.
    pub fn new(
        search: Arc<dyn SearchProvider>,
        backend: SharedBackend,
        gate: SharedRateGate,
        tuning: &Tuning,
    ) -> Self {
        let limits = &tuning.limits;
        info!(
            search = search.name(),
            backend = backend.name(),
            rate_per_sec = gate.calls_per_second(),
            max_topics = limits.max_topics,
            "digest service assembled"
        );
        let news = NewsAggregator::new(
            search.clone(),
            backend.clone(),
            gate,
            RetryPolicy::from(&tuning.retry),
            limits.news_result_limit,
        );
        let discussion = DiscussionAggregator::new(
            search,
            backend.clone(),
            limits.discussion_result_limit,
            &limits.discussion_site,
            limits.discussion_recency_days,
        );
        Self {
            news,
            discussion,
            backend,
            max_topics: limits.max_topics,
        }
    }

    /// Real (or mock-mode) providers from configuration.
    pub fn from_config(config: &DigestConfig, gate: SharedRateGate) -> DigestResult<Self> {
        let search: Arc<dyn SearchProvider> = if config.mock_mode {
            Arc::new(MockSearch::new())
        } else {
            let t = &config.tuning.timeouts;
            Arc::new(SerperClient::new(
                config.serper_api_key.clone(),
                config.serper_endpoint.clone(),
                t.search(),
                t.connect(),
            )?)
        };
        let backend = build_backend(config)?;
        Ok(Self::new(search, backend, gate, &config.tuning))
    }

    /// Full request: both selected aggregators run concurrently, then one
    /// compiler call. Only invalid input or a compiler failure is an error.
    #[instrument(level = "info", skip_all, fields(mode = mode.as_str()))]
    pub async fn generate_summary(
        &self,
        raw_topics: &[String],
        mode: SourceMode,
    ) -> Result<String, PipelineError> {
        let topics = normalize_topics(raw_topics, self.max_topics)?;
        info!(topics = ?topics, "digest request");

        let news_fut = async {
            if mode.includes_news() {
                self.news.aggregate(&topics).await
            } else {
                AggregateResult::empty(AnalysisKind::News)
            }
        };
        let discussion_fut = async {
            if mode.includes_discussion() {
                self.discussion.aggregate(&topics).await
            } else {
                AggregateResult::empty(AnalysisKind::Discussion)
            }
        };
        let (news, discussion) = tokio::join!(news_fut, discussion_fut);

        let script = compile_broadcast(self.backend.as_ref(), &news, &discussion, &topics).await?;
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn topics_are_trimmed_and_deduplicated_in_order() {
        let out = normalize_topics(&owned(&[" AI ", "Bitcoin", "AI"]), 10).unwrap();
        assert_eq!(out, owned(&["AI", "Bitcoin"]));
    }

    #[test]
    fn blank_and_empty_topic_lists_are_rejected() {
        assert!(matches!(
            normalize_topics(&owned(&["AI", "  "]), 10),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(matches!(
            normalize_topics(&[], 10),
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn zero_cap_accepts_any_non_empty_list() {
        let many: Vec<String> = (0..25).map(|i| format!("t{i}")).collect();
        assert_eq!(normalize_topics(&many, 0).unwrap().len(), 25);
    }

    #[test]
    fn too_many_topics_are_rejected() {
        let err = normalize_topics(&owned(&["a", "b", "c"]), 2).unwrap_err();
        assert!(err.to_string().contains("at most 2"));
    }

    #[test]
    fn source_mode_accepts_reddit_alias() {
        let m: SourceMode = serde_json::from_str("\"reddit\"").unwrap();
        assert_eq!(m, SourceMode::Discussion);
        assert!(!m.includes_news());
        assert!(SourceMode::Both.includes_news() && SourceMode::Both.includes_discussion());
    }
}
