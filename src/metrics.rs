use std::sync::OnceLock;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process and register all
/// application metrics. Later calls return the same handle, whose `render()`
/// produces the text/plain scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("A global metrics recorder was already installed");
            }

            // Pre-register counters so they appear even before the first increment.
            counter!("trade_analyses_total").absolute(0);
            counter!("risk_metrics_total").absolute(0);
            counter!("invalid_trade_setups_total").absolute(0);
            counter!("whale_intelligence_total").absolute(0);
            counter!("blockchain_insights_total").absolute(0);
            counter!("trade_outcomes_closed_total").absolute(0);

            gauge!("active_sessions").set(0.0);

            // Histogram is lazily created on first record; force creation.
            histogram!("analysis_latency_seconds").record(0.0);

            handle
        })
        .clone()
}
