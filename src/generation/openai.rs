// src/generation/openai.rs
//! OpenAI-compatible Chat Completions backend. Requires an API key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::GenerationBackend;
use crate::error::{DigestError, DigestResult};

pub struct OpenAiBackend {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> DigestResult<Self> {
        if api_key.trim().is_empty() {
            return Err(DigestError::Configuration("missing OPENAI_API_KEY".into()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| DigestError::Configuration(format!("generation http client: {e}")))?;
        Ok(Self {
            http,
            url: format!("{}/v1/chat/completions", endpoint.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate(&self, system_prompt: &str, user_content: &str) -> DigestResult<String> {
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system_prompt,
                },
                Msg {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: 0.4,
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| DigestError::SummarizationFailed(format!("openai unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DigestError::SummarizationFailed(format!(
                "openai HTTP {status}: {}",
                text.trim()
            )));
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| DigestError::SummarizationFailed(format!("openai bad body: {e}")))?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
