// src/config/mod.rs
//! Process-wide configuration, read once at startup from the environment
//! (after `.env` is loaded) plus the optional tuning file.

pub mod tuning;

use std::env;
use std::path::PathBuf;

use crate::error::{DigestError, DigestResult};
pub use tuning::Tuning;

// --- env names & defaults ---
pub const ENV_SERPER_API_KEY: &str = "SERPER_API_KEY";
pub const ENV_SERPER_ENDPOINT: &str = "SERPER_ENDPOINT";
pub const ENV_GENERATION_PROVIDER: &str = "GENERATION_PROVIDER";
pub const ENV_GENERATION_ENDPOINT: &str = "GENERATION_ENDPOINT";
pub const ENV_GENERATION_MODEL: &str = "GENERATION_MODEL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_TEST_MODE: &str = "DIGEST_TEST_MODE";

pub const DEFAULT_SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProvider {
    /// Ollama `/api/chat`.
    Ollama,
    /// Any OpenAI-compatible `/v1/chat/completions` endpoint.
    OpenAi,
}

impl GenerationProvider {
    fn parse(raw: &str) -> DigestResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(DigestError::Configuration(format!(
                "unsupported {ENV_GENERATION_PROVIDER}: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub provider: GenerationProvider,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub serper_api_key: String,
    pub serper_endpoint: String,
    pub generation: GenerationConfig,
    pub tuning: Tuning,
    /// `DIGEST_TEST_MODE=mock`: in-process search + generation, no credentials.
    pub mock_mode: bool,
}

impl DigestConfig {
    /// Read from the process environment. Call `dotenvy::dotenv()` first.
    pub fn from_env() -> DigestResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; missing required values are
    /// `DigestError::Configuration` naming the variable.
    pub fn from_lookup<F>(lookup: F) -> DigestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mock_mode = get(ENV_TEST_MODE).is_some_and(|v| v.eq_ignore_ascii_case("mock"));

        let required = |name: &str, mock_default: &str| -> DigestResult<String> {
            match get(name) {
                Some(v) => Ok(v),
                None if mock_mode => Ok(mock_default.to_string()),
                None => Err(DigestError::Configuration(format!("missing {name} env var"))),
            }
        };

        let serper_api_key = required(ENV_SERPER_API_KEY, "mock")?;
        let serper_endpoint =
            get(ENV_SERPER_ENDPOINT).unwrap_or_else(|| DEFAULT_SERPER_ENDPOINT.to_string());

        let provider = GenerationProvider::parse(&get(ENV_GENERATION_PROVIDER).unwrap_or_default())?;
        let endpoint = required(ENV_GENERATION_ENDPOINT, "http://127.0.0.1:11434")?;
        let model = required(ENV_GENERATION_MODEL, "mock")?;
        let api_key = match provider {
            GenerationProvider::OpenAi => Some(required(ENV_OPENAI_API_KEY, "mock")?),
            GenerationProvider::Ollama => None,
        };

        let tuning = load_tuning(&get)?.apply_overrides(&get)?;

        Ok(Self {
            serper_api_key,
            serper_endpoint,
            generation: GenerationConfig {
                provider,
                endpoint: endpoint.trim_end_matches('/').to_string(),
                model,
                api_key,
            },
            tuning,
            mock_mode,
        })
    }
}

/// 1) $DIGEST_CONFIG_PATH (must exist)
/// 2) config/digest.toml (if present)
/// 3) built-in defaults
fn load_tuning<F>(get: &F) -> DigestResult<Tuning>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(p) = get(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(DigestError::Configuration(format!(
                "{ENV_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            )));
        }
        return Tuning::load_from_file(&pb);
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        return Tuning::load_from_file(&default_p);
    }
    Ok(Tuning::default())
}
