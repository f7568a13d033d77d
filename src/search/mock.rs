// src/search/mock.rs
//! Scriptable in-process search provider for tests and `DIGEST_TEST_MODE=mock`.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Instant;

use super::{SearchProvider, SearchResult};
use crate::error::{DigestError, DigestResult};

#[derive(Debug, Clone)]
enum Outcome {
    RateLimited,
    Unavailable(String),
    Empty,
}

#[derive(Debug)]
struct Rule {
    /// Applies when the query contains this text.
    needle: String,
    outcome: Outcome,
    /// `None` = always; `Some(n)` = the next `n` matching calls only.
    remaining: Option<u32>,
}

/// Records every call; by default returns `limit` synthetic hits per query.
#[derive(Debug, Default)]
pub struct MockSearch {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query containing `needle` fails with `SearchUnavailable`.
    pub fn fail_when(self, needle: &str, message: &str) -> Self {
        self.push(needle, Outcome::Unavailable(message.to_string()), None)
    }

    /// The next `times` queries containing `needle` are rate limited.
    pub fn rate_limit_when(self, needle: &str, times: u32) -> Self {
        self.push(needle, Outcome::RateLimited, Some(times))
    }

    /// Every query containing `needle` returns no organic results.
    pub fn empty_when(self, needle: &str) -> Self {
        self.push(needle, Outcome::Empty, None)
    }

    fn push(self, needle: &str, outcome: Outcome, remaining: Option<u32>) -> Self {
        self.rules
            .lock()
            .expect("mock rules mutex poisoned")
            .push(Rule {
                needle: needle.to_string(),
                outcome,
                remaining,
            });
        self
    }

    /// Queries seen so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        let calls = self.calls.lock().expect("mock calls mutex poisoned");
        calls.iter().map(|(_, q)| q.clone()).collect()
    }

    /// Call start instants, in call order.
    pub fn call_starts(&self) -> Vec<Instant> {
        let calls = self.calls.lock().expect("mock calls mutex poisoned");
        calls.iter().map(|(t, _)| *t).collect()
    }

    fn matching_outcome(&self, query: &str) -> Option<Outcome> {
        let mut rules = self.rules.lock().expect("mock rules mutex poisoned");
        for rule in rules.iter_mut() {
            if !query.contains(&rule.needle) {
                continue;
            }
            match rule.remaining {
                Some(0) => continue,
                Some(ref mut n) => *n -= 1,
                None => {}
            }
            return Some(rule.outcome.clone());
        }
        None
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, limit: usize) -> DigestResult<Vec<SearchResult>> {
        self.calls
            .lock()
            .expect("mock calls mutex poisoned")
            .push((Instant::now(), query.to_string()));

        match self.matching_outcome(query) {
            Some(Outcome::RateLimited) => Err(DigestError::RateLimited),
            Some(Outcome::Unavailable(msg)) => Err(DigestError::SearchUnavailable(msg)),
            Some(Outcome::Empty) => Ok(Vec::new()),
            None => Ok((1..=limit)
                .map(|i| {
                    SearchResult::new(
                        &format!("Story {i} for {query}"),
                        &format!("Snippet {i}"),
                        &format!("https://example.test/{i}"),
                    )
                })
                .collect()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
