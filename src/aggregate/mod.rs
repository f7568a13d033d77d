// src/aggregate/mod.rs
//! Per-source topic aggregation: one topic -> text mapping per source.

pub mod discussion;
pub mod news;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub use discussion::DiscussionAggregator;
pub use news::NewsAggregator;

/// Topic -> generated text (or inline error text), in topic input order.
pub type TopicSummary = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    News,
    Discussion,
}

impl AnalysisKind {
    /// Key the mapping is published under.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::News => "news_analysis",
            Self::Discussion => "discussion_analysis",
        }
    }

    /// Metrics label.
    pub fn source(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Discussion => "discussion",
        }
    }
}

/// Named bundle around one aggregator's mapping.
/// Serializes as `{"news_analysis": {...}}` / `{"discussion_analysis": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    pub kind: AnalysisKind,
    pub summaries: TopicSummary,
}

impl AggregateResult {
    pub fn new(kind: AnalysisKind, summaries: TopicSummary) -> Self {
        Self { kind, summaries }
    }

    /// Placeholder for a source that was not selected.
    pub fn empty(kind: AnalysisKind) -> Self {
        Self::new(kind, TopicSummary::new())
    }

    pub fn get(&self, topic: &str) -> Option<&str> {
        self.summaries.get(topic).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.tag(), &self.summaries)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_under_its_tag_in_topic_order() {
        let mut m = TopicSummary::new();
        m.insert("Zed".into(), "z".into());
        m.insert("AI".into(), "a".into());
        let json = serde_json::to_string(&AggregateResult::new(AnalysisKind::News, m)).unwrap();
        assert_eq!(json, r#"{"news_analysis":{"Zed":"z","AI":"a"}}"#);
    }

    #[test]
    fn empty_result_has_no_topics() {
        let r = AggregateResult::empty(AnalysisKind::Discussion);
        assert!(r.is_empty());
        assert_eq!(r.get("AI"), None);
    }

    #[test]
    fn metric_source_labels() {
        assert_eq!(AnalysisKind::News.source(), "news");
        assert_eq!(AnalysisKind::Discussion.source(), "discussion");
    }
}
