// src/aggregate/news.rs
//! News aggregation: listing search -> headline extraction -> news script.
//!
//! Topics run one at a time in input order. Every attempt first waits on the
//! shared [`RateGate`]; retryable failures are retried per topic, so a topic
//! that already succeeded is never fetched again.

use html_escape::{encode_double_quoted_attribute, encode_text};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{AggregateResult, AnalysisKind, TopicSummary};
use crate::error::DigestResult;
use crate::extract::{headlines_from_html, BLOCK_DELIMITER};
use crate::generation::{summarize, PromptRole, SharedBackend};
use crate::rate::SharedRateGate;
use crate::retry::RetryPolicy;
use crate::search::query::news_listing_url;
use crate::search::{SearchProvider, SearchResult};

/// Recorded when the listing has no usable headline.
pub const NO_HEADLINES_MARKER: &str = "No news headlines found for this topic.";

pub struct NewsAggregator {
    search: Arc<dyn SearchProvider>,
    backend: SharedBackend,
    gate: SharedRateGate,
    retry: RetryPolicy,
    result_limit: usize,
}

impl NewsAggregator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        backend: SharedBackend,
        gate: SharedRateGate,
        retry: RetryPolicy,
        result_limit: usize,
    ) -> Self {
        Self {
            search,
            backend,
            gate,
            retry,
            result_limit: result_limit.max(1),
        }
    }

    /// One entry per topic, in input order. A failing topic gets
    /// `Error: <message>` and the batch carries on.
    #[instrument(level = "info", skip_all, fields(topics = topics.len()))]
    pub async fn aggregate(&self, topics: &[String]) -> AggregateResult {
        let mut summaries = TopicSummary::with_capacity(topics.len());
        let mut failed = 0usize;

        for topic in topics {
            if summaries.contains_key(topic) {
                continue;
            }
            counter!("digest_topics_total", "source" => AnalysisKind::News.source()).increment(1);
            let text = match self
                .retry
                .run(topic, move |attempt| self.process_topic(topic, attempt))
                .await
            {
                Ok(text) => {
                    debug!(topic = %topic, chars = text.len(), "news topic done");
                    text
                }
                Err(e) => {
                    failed += 1;
                    counter!("digest_topic_errors_total", "source" => AnalysisKind::News.source()).increment(1);
                    warn!(topic = %topic, error = %e, "news topic failed");
                    format!("Error: {e}")
                }
            };
            summaries.insert(topic.clone(), text);
        }

        info!(topics = summaries.len(), failed, "news aggregation finished");
        AggregateResult::new(AnalysisKind::News, summaries)
    }

    async fn process_topic(&self, topic: &str, attempt: u32) -> DigestResult<String> {
        self.gate.acquire().await;
        debug!(topic, attempt, "news fetch");

        let query = news_listing_url(topic);
        let hits = self.search.search(&query, self.result_limit).await?;
        let headlines = headlines_from_html(&render_listing(&hits));
        if headlines.is_empty() {
            return Ok(NO_HEADLINES_MARKER.to_string());
        }

        summarize(self.backend.as_ref(), PromptRole::NewsEditor, &headlines).await
    }
}

/// Render search hits as a news listing page: every article's title line
/// comes before its "More" link, the shape `extract_headlines` expects.
pub fn render_listing(hits: &[SearchResult]) -> String {
    let mut page = String::from("<html><body>\n");
    for hit in hits {
        let title = hit.title.as_deref().map(str::trim).unwrap_or_default();
        let snippet = hit.snippet.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() && snippet.is_empty() {
            continue;
        }
        let link = hit.link.as_deref().unwrap_or("#");
        page.push_str("<article>");
        if !title.is_empty() {
            page.push_str(&format!("<h3>{}</h3>", encode_text(title)));
        }
        if !snippet.is_empty() {
            page.push_str(&format!("<p>{}</p>", encode_text(snippet)));
        }
        page.push_str(&format!(
            "<a href=\"{}\">{BLOCK_DELIMITER}</a></article>\n",
            encode_double_quoted_attribute(link)
        ));
    }
    page.push_str("</body></html>");
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_yields_one_headline_per_titled_hit() {
        let hits = vec![
            SearchResult::new("Chips <export> curbs", "Details", "https://a.test/1?x=1&y=2"),
            SearchResult::default(),
            SearchResult {
                title: None,
                snippet: Some("Only a snippet".into()),
                link: None,
            },
            SearchResult::new("Second", "More detail", "https://a.test/2"),
        ];
        let page = render_listing(&hits);
        assert_eq!(
            headlines_from_html(&page),
            "Chips <export> curbs\nOnly a snippet\nSecond"
        );
    }

    #[test]
    fn empty_listing_has_no_headlines() {
        assert_eq!(headlines_from_html(&render_listing(&[])), "");
    }
}
