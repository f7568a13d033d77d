// tests/config_env.rs
use news_digest::config::{DigestConfig, GenerationProvider};
use news_digest::DigestError;
use std::collections::HashMap;
use std::{env, fs};

fn base_vars(extra: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
    let mut map: HashMap<String, String> = [
        ("SERPER_API_KEY", "k"),
        ("GENERATION_ENDPOINT", "http://localhost:11434"),
        ("GENERATION_MODEL", "llama3"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        map.insert(k.to_string(), v.clone());
    }
    move |k| map.get(k).cloned()
}

#[serial_test::serial]
#[test]
fn tuning_file_precedence_env_path_then_default_file() {
    // Isolate CWD so the repo's own config/ is not read.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    // 1) Nothing on disk -> built-in defaults
    let cfg = DigestConfig::from_lookup(base_vars(&[])).unwrap();
    assert_eq!(cfg.tuning.limits.news_result_limit, 5);
    assert_eq!(cfg.tuning.rate.news_calls_per_second, 5);

    // 2) ./config/digest.toml is picked up
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/digest.toml"),
        "[limits]\nnews_result_limit = 7\n",
    )
    .unwrap();
    let cfg = DigestConfig::from_lookup(base_vars(&[])).unwrap();
    assert_eq!(cfg.tuning.limits.news_result_limit, 7);
    assert_eq!(cfg.tuning.limits.discussion_result_limit, 3);

    // 3) DIGEST_CONFIG_PATH wins over the default file
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "[rate]\nnews_calls_per_second = 2\n").unwrap();
    let cfg = DigestConfig::from_lookup(base_vars(&[(
        "DIGEST_CONFIG_PATH",
        p_env.display().to_string(),
    )]))
    .unwrap();
    assert_eq!(cfg.tuning.rate.news_calls_per_second, 2);
    assert_eq!(cfg.tuning.limits.news_result_limit, 5);

    // 4) Env overrides apply on top of the file
    let cfg = DigestConfig::from_lookup(base_vars(&[
        ("DIGEST_CONFIG_PATH", p_env.display().to_string()),
        ("DIGEST_NEWS_CALLS_PER_SECOND", "9".to_string()),
    ]))
    .unwrap();
    assert_eq!(cfg.tuning.rate.news_calls_per_second, 9);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn missing_config_path_is_an_error() {
    let err = DigestConfig::from_lookup(base_vars(&[(
        "DIGEST_CONFIG_PATH",
        "/definitely/not/here.toml".to_string(),
    )]))
    .unwrap_err();
    assert!(matches!(err, DigestError::Configuration(ref m) if m.contains("DIGEST_CONFIG_PATH")));
}

#[serial_test::serial]
#[test]
fn zero_rate_override_is_rejected() {
    let err = DigestConfig::from_lookup(base_vars(&[(
        "DIGEST_NEWS_CALLS_PER_SECOND",
        "0".to_string(),
    )]))
    .unwrap_err();
    assert!(err.to_string().contains("news_calls_per_second"));
}

#[serial_test::serial]
#[test]
fn from_env_reads_process_environment() {
    for k in [
        "SERPER_API_KEY",
        "GENERATION_PROVIDER",
        "GENERATION_ENDPOINT",
        "GENERATION_MODEL",
        "DIGEST_TEST_MODE",
        "DIGEST_CONFIG_PATH",
    ] {
        env::remove_var(k);
    }
    let err = DigestConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("SERPER_API_KEY"));

    env::set_var("DIGEST_TEST_MODE", "mock");
    let cfg = DigestConfig::from_env().unwrap();
    assert!(cfg.mock_mode);
    assert_eq!(cfg.generation.provider, GenerationProvider::Ollama);
    env::remove_var("DIGEST_TEST_MODE");
}
