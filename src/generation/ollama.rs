// src/generation/ollama.rs
//! Ollama chat backend (`POST {endpoint}/api/chat`, non-streaming).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::GenerationBackend;
use crate::error::{DigestError, DigestResult};

pub struct OllamaBackend {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(
        endpoint: &str,
        model: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> DigestResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| DigestError::Configuration(format!("generation http client: {e}")))?;
        Ok(Self {
            http,
            url: format!("{}/api/chat", endpoint.trim_end_matches('/')),
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
    stream: bool,
}

#[derive(Deserialize)]
struct Resp {
    message: Option<RespMsg>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct RespMsg {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
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
            stream: false,
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| DigestError::SummarizationFailed(format!("ollama unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DigestError::SummarizationFailed(format!(
                "ollama HTTP {status}: {}",
                text.trim()
            )));
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| DigestError::SummarizationFailed(format!("ollama bad body: {e}")))?;
        if let Some(err) = body.error {
            return Err(DigestError::SummarizationFailed(format!("ollama: {err}")));
        }
        Ok(body.message.map(|m| m.content).unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
