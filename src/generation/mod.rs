// src/generation/mod.rs
//! Generation backend abstraction and the summarization step.
//!
//! Every call is a two-message exchange: a fixed role instruction as the
//! system turn and the caller's content as the user turn.

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod prompts;

use async_trait::async_trait;
use metrics::histogram;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{DigestConfig, GenerationProvider};
use crate::error::{DigestError, DigestResult};

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptRole {
    /// Headlines -> spoken news script.
    NewsEditor,
    /// Forum posts -> discussion points, opinions, sentiment.
    DiscussionAnalyst,
    /// Per-topic news + discussion -> one narrated broadcast.
    BroadcastCompiler,
}

impl PromptRole {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::NewsEditor => prompts::NEWS_EDITOR,
            Self::DiscussionAnalyst => prompts::DISCUSSION_ANALYST,
            Self::BroadcastCompiler => prompts::BROADCAST_COMPILER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewsEditor => "news_editor",
            Self::DiscussionAnalyst => "discussion_analyst",
            Self::BroadcastCompiler => "broadcast_compiler",
        }
    }
}

impl fmt::Display for PromptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send one system+user exchange and return the generated text.
    async fn generate(&self, system_prompt: &str, user_content: &str) -> DigestResult<String>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type SharedBackend = Arc<dyn GenerationBackend>;

/// Run one generation call for `role`. Returns the generated text verbatim;
/// an empty answer counts as a failure.
pub async fn summarize(
    backend: &dyn GenerationBackend,
    role: PromptRole,
    content: &str,
) -> DigestResult<String> {
    let t0 = Instant::now();
    let out = backend.generate(role.system_prompt(), content).await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("digest_generation_ms", "role" => role.as_str()).record(ms);

    let text = out?;
    if text.trim().is_empty() {
        return Err(DigestError::SummarizationFailed(format!(
            "{} returned an empty answer",
            backend.name()
        )));
    }
    debug!(%role, backend = backend.name(), ms, chars = text.len(), "generation done");
    Ok(text)
}

/// Factory: build the backend named by the configuration.
///
/// * `mock_mode` returns a deterministic in-process backend.
/// * Otherwise Ollama or an OpenAI-compatible endpoint, with the configured
///   per-call timeout.
pub fn build_backend(config: &DigestConfig) -> DigestResult<SharedBackend> {
    if config.mock_mode {
        info!("generation backend: mock");
        return Ok(Arc::new(MockBackend::new()));
    }

    let gen = &config.generation;
    let timeouts = &config.tuning.timeouts;
    info!(
        provider = gen.provider.as_str(),
        endpoint = %gen.endpoint,
        model = %gen.model,
        timeout_secs = timeouts.generation_timeout_secs,
        "generation backend configured"
    );

    match gen.provider {
        GenerationProvider::Ollama => Ok(Arc::new(OllamaBackend::new(
            &gen.endpoint,
            &gen.model,
            timeouts.generation(),
            timeouts.connect(),
        )?)),
        GenerationProvider::OpenAi => {
            let key = gen.api_key.clone().unwrap_or_default();
            Ok(Arc::new(OpenAiBackend::new(
                &gen.endpoint,
                &gen.model,
                key,
                timeouts.generation(),
                timeouts.connect(),
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_generation_is_a_failure() {
        let backend = MockBackend::new().answer_with("   ");
        let err = summarize(&backend, PromptRole::NewsEditor, "A\nB")
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::SummarizationFailed(_)));
    }

    #[tokio::test]
    async fn role_instruction_is_the_system_turn() {
        let backend = MockBackend::new();
        summarize(&backend, PromptRole::DiscussionAnalyst, "Topic: AI")
            .await
            .unwrap();
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, prompts::DISCUSSION_ANALYST);
        assert_eq!(calls[0].user, "Topic: AI");
    }
}
