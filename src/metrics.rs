use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Install the Prometheus recorder once per process and describe our series.
/// Returns `None` if another recorder was installed first.
pub fn install() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_series();
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "prometheus: recorder not installed");
                None
            }
        })
        .clone()
}

fn describe_series() {
    describe_counter!("digest_requests_total", "Digest requests received.");
    describe_counter!(
        "digest_request_errors_total",
        "Digest requests answered with an error."
    );
    describe_counter!("digest_topics_total", "Topics processed, per source.");
    describe_counter!(
        "digest_topic_errors_total",
        "Topics recorded with an inline error, per source."
    );
    describe_counter!(
        "digest_search_rate_limited_total",
        "Search calls rejected with HTTP 429."
    );
    describe_histogram!(
        "digest_generation_ms",
        "Generation backend call time in milliseconds."
    );
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let handle = install();
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.map(|h| h.render()).unwrap_or_default() }
        }),
    )
}
