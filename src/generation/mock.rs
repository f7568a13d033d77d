// src/generation/mock.rs
//! Deterministic in-process backend for tests and local runs.

use async_trait::async_trait;
use std::sync::Mutex;

use super::GenerationBackend;
use crate::error::{DigestError, DigestResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
}

/// Answers `"Generated: <first user line>"` unless told otherwise.
#[derive(Debug, Default)]
pub struct MockBackend {
    fixed: Option<String>,
    /// Fail every call whose system or user text contains one of these.
    fail_on: Vec<(String, String)>,
    unreachable: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_with(mut self, text: &str) -> Self {
        self.fixed = Some(text.to_string());
        self
    }

    pub fn fail_when(mut self, needle: &str, message: &str) -> Self {
        self.fail_on.push((needle.to_string(), message.to_string()));
        self
    }

    /// Every call fails as if the backend host refused connections.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock calls mutex poisoned").clone()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, system_prompt: &str, user_content: &str) -> DigestResult<String> {
        self.calls
            .lock()
            .expect("mock calls mutex poisoned")
            .push(RecordedCall {
                system: system_prompt.to_string(),
                user: user_content.to_string(),
            });

        if self.unreachable {
            return Err(DigestError::SummarizationFailed(
                "backend unreachable: connection refused".into(),
            ));
        }
        if let Some((_, msg)) = self
            .fail_on
            .iter()
            .find(|(needle, _)| system_prompt.contains(needle) || user_content.contains(needle))
        {
            return Err(DigestError::SummarizationFailed(msg.clone()));
        }
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }
        let first = user_content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        Ok(format!("Generated: {}", first.trim()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
