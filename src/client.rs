//! Caller-side client for the digest API, used by the `digest-client` binary.
//! Keeps "could not reach the service" apart from errors the service reports.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::api::{ErrorBody, SummaryRequest, SummaryResponse};
use crate::pipeline::SourceMode;

/// Topic cap enforced on the caller side only.
pub const MAX_CLIENT_TOPICS: usize = 3;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid topics: {0}")]
    InvalidTopics(String),
    /// The service could not be reached at all.
    #[error("could not connect to the backend server: {0}")]
    Connectivity(String),
    /// Connected, but no complete answer within the request timeout.
    #[error("backend server did not answer within {0:?}")]
    Timeout(Duration),
    /// The service answered with an error status and a detail message.
    #[error("API Error ({status}): {detail}")]
    Api { status: StatusCode, detail: String },
    #[error("Unexpected API Response: {0}")]
    UnexpectedResponse(String),
}

pub struct DigestClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DigestClient {
    /// `timeout` bounds the whole request; generation can take minutes.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub async fn generate(
        &self,
        topics: &[String],
        source: SourceMode,
    ) -> Result<String, ClientError> {
        let topics = check_topics(topics)?;
        let req = SummaryRequest {
            topics,
            source_type: source,
        };

        let resp = self
            .http
            .post(format!("{}/generate-news-summary", self.base_url))
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            return serde_json::from_str::<SummaryResponse>(&text)
                .map(|r| r.summary)
                .map_err(|_| ClientError::UnexpectedResponse(text));
        }
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(ClientError::Api {
                status,
                detail: body.detail,
            }),
            Err(_) => Err(ClientError::UnexpectedResponse(text)),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connectivity(e.to_string())
        } else if e.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::UnexpectedResponse(e.to_string())
        }
    }
}

/// 1..=3 non-blank topics, trimmed, duplicates dropped.
pub fn check_topics(raw: &[String]) -> Result<Vec<String>, ClientError> {
    let mut out: Vec<String> = Vec::new();
    for t in raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|s| s == t) {
            out.push(t.to_string());
        }
    }
    if out.is_empty() {
        return Err(ClientError::InvalidTopics("add at least one topic".into()));
    }
    if out.len() > MAX_CLIENT_TOPICS {
        return Err(ClientError::InvalidTopics(format!(
            "at most {MAX_CLIENT_TOPICS} topics"
        )));
    }
    Ok(out)
}
