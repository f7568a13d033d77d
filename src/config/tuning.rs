// src/config/tuning.rs
//! Optional tuning knobs from `config/digest.toml`, each overridable by a
//! `DIGEST_<NAME>` environment variable.
//!
//! TOML shape:
//! ```toml
//! [limits]
//! news_result_limit = 5
//! discussion_result_limit = 3
//! discussion_recency_days = 14
//! discussion_site = "reddit.com"
//! max_topics = 0    # 0 = no cap
//!
//! [timeouts]
//! search_timeout_secs = 30
//! generation_timeout_secs = 120
//! connect_timeout_secs = 5
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 2000
//! max_delay_ms = 10000
//!
//! [rate]
//! news_calls_per_second = 5
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DigestError, DigestResult};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tuning {
    pub limits: Limits,
    pub timeouts: Timeouts,
    pub retry: RetryTuning,
    pub rate: RateTuning,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Limits {
    pub news_result_limit: usize,
    pub discussion_result_limit: usize,
    pub discussion_recency_days: i64,
    pub discussion_site: String,
    /// Per-request topic cap; 0 means any number of topics is accepted.
    pub max_topics: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            news_result_limit: 5,
            discussion_result_limit: 3,
            discussion_recency_days: 14,
            discussion_site: "reddit.com".to_string(),
            max_topics: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timeouts {
    pub search_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            search_timeout_secs: 30,
            generation_timeout_secs: 120,
            connect_timeout_secs: 5,
        }
    }
}

impl Timeouts {
    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryTuning {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryTuning {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateTuning {
    pub news_calls_per_second: u32,
}

impl Default for RateTuning {
    fn default() -> Self {
        Self {
            news_calls_per_second: 5,
        }
    }
}

impl Tuning {
    /// Parse a TOML document; absent tables and keys fall back to defaults.
    pub fn from_toml_str(s: &str) -> DigestResult<Self> {
        toml::from_str(s).map_err(|e| DigestError::Configuration(format!("tuning toml: {e}")))
    }

    pub fn load_from_file(path: &Path) -> DigestResult<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            DigestError::Configuration(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&data)
    }

    /// Apply `DIGEST_*` overrides, then reject values the pipeline cannot run with.
    pub fn apply_overrides<F>(mut self, lookup: F) -> DigestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let l = &mut self.limits;
        override_num(&lookup, "DIGEST_NEWS_RESULT_LIMIT", &mut l.news_result_limit)?;
        override_num(&lookup, "DIGEST_DISCUSSION_RESULT_LIMIT", &mut l.discussion_result_limit)?;
        override_num(&lookup, "DIGEST_DISCUSSION_RECENCY_DAYS", &mut l.discussion_recency_days)?;
        override_num(&lookup, "DIGEST_MAX_TOPICS", &mut l.max_topics)?;
        if let Some(site) = lookup("DIGEST_DISCUSSION_SITE").filter(|s| !s.trim().is_empty()) {
            l.discussion_site = site.trim().to_string();
        }

        let t = &mut self.timeouts;
        override_num(&lookup, "DIGEST_SEARCH_TIMEOUT_SECS", &mut t.search_timeout_secs)?;
        override_num(&lookup, "DIGEST_GENERATION_TIMEOUT_SECS", &mut t.generation_timeout_secs)?;
        override_num(&lookup, "DIGEST_CONNECT_TIMEOUT_SECS", &mut t.connect_timeout_secs)?;

        let r = &mut self.retry;
        override_num(&lookup, "DIGEST_RETRY_MAX_ATTEMPTS", &mut r.max_attempts)?;
        override_num(&lookup, "DIGEST_RETRY_BASE_DELAY_MS", &mut r.base_delay_ms)?;
        override_num(&lookup, "DIGEST_RETRY_MAX_DELAY_MS", &mut r.max_delay_ms)?;

        override_num(
            &lookup,
            "DIGEST_NEWS_CALLS_PER_SECOND",
            &mut self.rate.news_calls_per_second,
        )?;

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> DigestResult<()> {
        let bad = |what: &str| Err(DigestError::Configuration(format!("{what} must be > 0")));
        if self.limits.news_result_limit == 0 {
            return bad("news_result_limit");
        }
        if self.limits.discussion_result_limit == 0 {
            return bad("discussion_result_limit");
        }
        if self.timeouts.search_timeout_secs == 0 || self.timeouts.generation_timeout_secs == 0 {
            return bad("timeouts");
        }
        if self.retry.max_attempts == 0 {
            return bad("retry.max_attempts");
        }
        if self.rate.news_calls_per_second == 0 {
            return bad("rate.news_calls_per_second");
        }
        Ok(())
    }
}

fn override_num<F, T>(lookup: &F, name: &str, slot: &mut T) -> DigestResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(name) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| DigestError::Configuration(format!("{name}: not a number: {raw}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let t = Tuning::from_toml_str("[retry]\nmax_attempts = 5\n").unwrap();
        assert_eq!(t.retry.max_attempts, 5);
        assert_eq!(t.retry.base_delay_ms, 2_000);
        assert_eq!(t.limits, Limits::default());
        assert_eq!(t.rate.news_calls_per_second, 5);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = [
            ("DIGEST_NEWS_CALLS_PER_SECOND", "2"),
            ("DIGEST_DISCUSSION_SITE", " news.ycombinator.com "),
        ]
        .into_iter()
        .collect();
        let t = Tuning::from_toml_str("[rate]\nnews_calls_per_second = 9\n")
            .unwrap()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(t.rate.news_calls_per_second, 2);
        assert_eq!(t.limits.discussion_site, "news.ycombinator.com");
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = Tuning::from_toml_str("[rate]\nnews_calls_per_second = 0\n")
            .unwrap()
            .apply_overrides(no_env)
            .unwrap_err();
        assert!(matches!(err, DigestError::Configuration(_)));
    }

    #[test]
    fn garbage_override_is_a_configuration_error() {
        let err = Tuning::default()
            .apply_overrides(|k| (k == "DIGEST_MAX_TOPICS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("DIGEST_MAX_TOPICS"));
    }
}
