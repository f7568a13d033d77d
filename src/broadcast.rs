//! Broadcast compiler: merges both aggregators' outputs into one prompt and
//! makes the single, all-or-nothing generation call for the final script.

use tracing::{info, instrument};

use crate::aggregate::AggregateResult;
use crate::error::DigestResult;
use crate::generation::{summarize, GenerationBackend, PromptRole};

pub const TOPIC_SEPARATOR: &str = "\n\n--- NEW TOPIC ---\n\n";
pub const PROMPT_PREFIX: &str = "Generate spoken segments for:\n\n";

/// Per-topic block, or `None` when the topic has neither news nor discussion.
fn topic_block(topic: &str, news: &str, discussion: &str) -> Option<String> {
    let mut sections: Vec<String> = Vec::with_capacity(2);
    if !news.trim().is_empty() {
        sections.push(format!("OFFICIAL NEWS:\n{news}"));
    }
    if !discussion.trim().is_empty() {
        sections.push(format!("DISCUSSION:\n{discussion}"));
    }
    if sections.is_empty() {
        return None;
    }
    Some(format!("TOPIC: {topic}\n{}", sections.join("\n")))
}

/// User content for the compiler call. Topics keep the caller's order;
/// a topic missing from a result counts as empty for that source.
pub fn build_broadcast_prompt(
    news: &AggregateResult,
    discussion: &AggregateResult,
    topics: &[String],
) -> String {
    let blocks: Vec<String> = topics
        .iter()
        .filter_map(|t| {
            topic_block(
                t,
                news.get(t).unwrap_or_default(),
                discussion.get(t).unwrap_or_default(),
            )
        })
        .collect();
    format!("{PROMPT_PREFIX}{}", blocks.join(TOPIC_SEPARATOR))
}

/// Backend failure propagates to the caller.
#[instrument(level = "info", skip_all, fields(topics = topics.len()))]
pub async fn compile_broadcast(
    backend: &dyn GenerationBackend,
    news: &AggregateResult,
    discussion: &AggregateResult,
    topics: &[String],
) -> DigestResult<String> {
    let prompt = build_broadcast_prompt(news, discussion, topics);
    let script = summarize(backend, PromptRole::BroadcastCompiler, &prompt).await?;
    info!(chars = script.len(), "broadcast compiled");
    Ok(script)
}
