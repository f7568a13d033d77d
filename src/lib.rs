// src/lib.rs
// Public library surface for the service binary, the client binary and
// integration tests.

pub mod aggregate;
pub mod api;
pub mod broadcast;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod metrics;
pub mod pipeline;
pub mod rate;
pub mod retry;
pub mod search;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::DigestConfig;
pub use crate::error::{DigestError, DigestResult};
pub use crate::pipeline::{DigestService, SourceMode};

use anyhow::Context;
use tracing::info;

/// Build the full router from the environment (`.env` already loaded).
/// Configuration problems surface here, before any request is served.
pub async fn app() -> anyhow::Result<axum::Router> {
    let config = DigestConfig::from_env().context("loading digest configuration")?;
    // Never log credentials; key length is enough to spot an empty value.
    info!(
        serper_key_len = config.serper_api_key.len(),
        provider = config.generation.provider.as_str(),
        model = %config.generation.model,
        mock = config.mock_mode,
        rate_per_sec = config.tuning.rate.news_calls_per_second,
        "digest config loaded"
    );
    let state = AppState::from_config(&config).context("building digest service")?;
    Ok(router(state))
}
