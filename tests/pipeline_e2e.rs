// tests/pipeline_e2e.rs
//
// Full request flow through DigestService with mock providers.

use std::sync::Arc;

use news_digest::broadcast::{PROMPT_PREFIX, TOPIC_SEPARATOR};
use news_digest::config::Tuning;
use news_digest::generation::prompts::{BROADCAST_COMPILER, DISCUSSION_ANALYST, NEWS_EDITOR};
use news_digest::generation::MockBackend;
use news_digest::pipeline::PipelineError;
use news_digest::rate::RateGate;
use news_digest::search::MockSearch;
use news_digest::{DigestService, SourceMode};

fn topics(ts: &[&str]) -> Vec<String> {
    ts.iter().map(|t| t.to_string()).collect()
}

fn service(search: Arc<MockSearch>, backend: Arc<MockBackend>) -> DigestService {
    let mut tuning = Tuning::default();
    tuning.retry.base_delay_ms = 10;
    tuning.retry.max_delay_ms = 40;
    DigestService::new(search, backend, RateGate::shared(50).expect("gate"), &tuning)
}

#[tokio::test]
async fn both_sources_make_two_searches_and_three_generations() {
    let search = Arc::new(MockSearch::new());
    let backend = Arc::new(MockBackend::new());
    let svc = service(search.clone(), backend.clone());

    let script = svc
        .generate_summary(&topics(&["AI"]), SourceMode::Both)
        .await
        .expect("summary");
    assert_eq!(script, "Generated: Generate spoken segments for:");

    let queries = search.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries.iter().any(|q| q.starts_with("https://news.google.com/search?q=AI")));
    assert!(queries.iter().any(|q| q.starts_with("AI site:reddit.com after:")));

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls.iter().filter(|c| c.system == NEWS_EDITOR).count(), 1);
    assert_eq!(calls.iter().filter(|c| c.system == DISCUSSION_ANALYST).count(), 1);

    // Compiler runs last and sees both sections for the topic.
    let last = calls.last().expect("compiler call");
    assert_eq!(last.system, BROADCAST_COMPILER);
    assert!(last.user.starts_with(PROMPT_PREFIX));
    assert!(last.user.contains("TOPIC: AI\nOFFICIAL NEWS:\nGenerated: Story 1 for"));
    assert!(last.user.contains("\nDISCUSSION:\nGenerated: Topic: AI"));
}

#[tokio::test]
async fn news_only_mode_never_searches_discussion() {
    let search = Arc::new(MockSearch::new());
    let backend = Arc::new(MockBackend::new());
    let svc = service(search.clone(), backend.clone());

    svc.generate_summary(&topics(&["AI", "Bitcoin"]), SourceMode::News)
        .await
        .expect("summary");

    assert!(search.queries().iter().all(|q| !q.contains("site:")));
    let compiler = backend.calls().pop().expect("compiler call");
    assert!(!compiler.user.contains("DISCUSSION:"));
    assert_eq!(compiler.user.matches(TOPIC_SEPARATOR).count(), 1);
}

#[tokio::test]
async fn discussion_only_mode_skips_news() {
    let search = Arc::new(MockSearch::new());
    let backend = Arc::new(MockBackend::new());
    let svc = service(search.clone(), backend.clone());

    svc.generate_summary(&topics(&["AI"]), SourceMode::Discussion)
        .await
        .expect("summary");

    assert_eq!(search.queries().len(), 1);
    let compiler = backend.calls().pop().expect("compiler call");
    assert!(!compiler.user.contains("OFFICIAL NEWS:"));
    assert!(compiler.user.contains("DISCUSSION:"));
}

#[tokio::test]
async fn failed_topics_still_reach_the_compiler_as_text() {
    let search = Arc::new(MockSearch::new().fail_when("Broken", "down"));
    let backend = Arc::new(MockBackend::new());
    let svc = service(search, backend.clone());

    svc.generate_summary(&topics(&["Broken"]), SourceMode::Both)
        .await
        .expect("per-topic failures do not fail the request");

    let compiler = backend.calls().pop().expect("compiler call");
    assert!(compiler.user.contains("OFFICIAL NEWS:\nError: search unavailable: down"));
    assert!(compiler
        .user
        .contains("DISCUSSION:\nError processing topic 'Broken': search unavailable: down"));
}

#[tokio::test]
async fn compiler_failure_fails_the_request() {
    let backend = Arc::new(MockBackend::new().fail_when("news anchor assistant", "no model"));
    let svc = service(Arc::new(MockSearch::new()), backend);

    let err = svc
        .generate_summary(&topics(&["AI"]), SourceMode::Both)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Failed(_)));
    assert_eq!(err.to_string(), "summarization failed: no model");
}

#[tokio::test]
async fn default_config_accepts_more_topics_than_the_client_sends() {
    let search = Arc::new(MockSearch::new());
    let backend = Arc::new(MockBackend::new());
    let svc = service(search.clone(), backend.clone());

    let many: Vec<String> = (0..11).map(|i| format!("topic{i}")).collect();
    svc.generate_summary(&many, SourceMode::Discussion)
        .await
        .expect("no server-side topic cap by default");

    assert_eq!(search.queries().len(), 11);
    let compiler = backend.calls().pop().expect("compiler call");
    assert_eq!(compiler.system, BROADCAST_COMPILER);
    for t in &many {
        assert!(compiler.user.contains(&format!("TOPIC: {t}\nDISCUSSION:")), "missing {t}");
    }
    assert_eq!(compiler.user.matches(TOPIC_SEPARATOR).count(), 10);
}

#[tokio::test]
async fn configured_topic_cap_is_enforced() {
    let mut tuning = Tuning::default();
    tuning.limits.max_topics = 2;
    let search = Arc::new(MockSearch::new());
    let svc = DigestService::new(
        search.clone(),
        Arc::new(MockBackend::new()),
        RateGate::shared(50).expect("gate"),
        &tuning,
    );

    let err = svc
        .generate_summary(&topics(&["a", "b", "c"]), SourceMode::Both)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRequest(_)));
    assert!(search.queries().is_empty());
}

#[tokio::test]
async fn invalid_topics_fail_before_any_search() {
    let search = Arc::new(MockSearch::new());
    let svc = service(search.clone(), Arc::new(MockBackend::new()));

    let err = svc
        .generate_summary(&topics(&["   "]), SourceMode::Both)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRequest(_)));
    assert!(search.queries().is_empty());
}
