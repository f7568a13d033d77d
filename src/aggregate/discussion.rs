// src/aggregate/discussion.rs
//! Discussion aggregation: recent site-restricted posts -> discussion analysis.
//! No retry and no rate gate; failures are recorded per topic.

use metrics::counter;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{AggregateResult, AnalysisKind, TopicSummary};
use crate::error::{DigestError, DigestResult};
use crate::generation::{summarize, PromptRole, SharedBackend};
use crate::search::query::{discussion_query, recency_cutoff};
use crate::search::{SearchProvider, SearchResult};

/// Recorded when the search finds nothing; summarization is skipped.
pub const NO_POSTS_MARKER: &str = "No discussion posts found for this topic.";

pub struct DiscussionAggregator {
    search: Arc<dyn SearchProvider>,
    backend: SharedBackend,
    result_limit: usize,
    site: String,
    recency_days: i64,
}

impl DiscussionAggregator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        backend: SharedBackend,
        result_limit: usize,
        site: &str,
        recency_days: i64,
    ) -> Self {
        Self {
            search,
            backend,
            result_limit: result_limit.max(1),
            site: site.to_string(),
            recency_days,
        }
    }

    /// One entry per topic, in input order.
    #[instrument(level = "info", skip_all, fields(topics = topics.len()))]
    pub async fn aggregate(&self, topics: &[String]) -> AggregateResult {
        let mut summaries = TopicSummary::with_capacity(topics.len());
        let mut failed = 0usize;

        for topic in topics {
            if summaries.contains_key(topic) {
                continue;
            }
            counter!("digest_topics_total", "source" => AnalysisKind::Discussion.source()).increment(1);
            let text = match self.process_topic(topic).await {
                Ok(text) => text,
                Err(e) => {
                    failed += 1;
                    counter!("digest_topic_errors_total", "source" => AnalysisKind::Discussion.source()).increment(1);
                    warn!(topic = %topic, error = %e, "discussion topic failed");
                    failure_text(topic, &e)
                }
            };
            summaries.insert(topic.clone(), text);
        }

        info!(topics = summaries.len(), failed, "discussion aggregation finished");
        AggregateResult::new(AnalysisKind::Discussion, summaries)
    }

    async fn process_topic(&self, topic: &str) -> DigestResult<String> {
        let query = discussion_query(topic, &self.site, recency_cutoff(self.recency_days));
        let posts = self.search.search(&query, self.result_limit).await?;
        if posts.is_empty() {
            debug!(topic, "no discussion posts");
            return Ok(NO_POSTS_MARKER.to_string());
        }

        let content = render_posts(topic, &posts);
        summarize(self.backend.as_ref(), PromptRole::DiscussionAnalyst, &content).await
    }
}

/// Inline text recorded for a failed topic. Generation failures carry the
/// backend's own message.
fn failure_text(topic: &str, err: &DigestError) -> String {
    match err {
        DigestError::SummarizationFailed(msg) => format!("Generation error: {msg}"),
        other => format!("Error processing topic '{topic}': {other}"),
    }
}

/// Numbered post block fed to the discussion analyst.
pub fn render_posts(topic: &str, posts: &[SearchResult]) -> String {
    let mut out = format!("Topic: {topic}\n\n");
    for (i, post) in posts.iter().enumerate() {
        let _ = write!(
            out,
            "Post {}:\nTitle: {}\nSnippet: {}\nLink: {}\n\n",
            i + 1,
            post.title.as_deref().unwrap_or("No Title"),
            post.snippet.as_deref().unwrap_or("No Snippet"),
            post.link.as_deref().unwrap_or("No Link"),
        );
    }
    out
}
