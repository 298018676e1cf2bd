//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all STM Index metrics
pub const METRICS_PREFIX: &str = "stmindex";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Buckets for external fetches (Scholar, WordPress); typically slower
pub const UPSTREAM_BUCKETS: &[f64] = &[
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Recommendation metrics
    describe_counter!(
        format!("{}_recommendations_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviewer recommendation requests"
    );

    describe_gauge!(
        format!("{}_recommendation_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of reviewers returned from the last recommendation"
    );

    // Verification metrics
    describe_counter!(
        format!("{}_verifications_total", METRICS_PREFIX),
        Unit::Count,
        "Total Scholar verification attempts"
    );

    describe_histogram!(
        format!("{}_verification_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Scholar verification latency in seconds"
    );

    // Sync metrics
    describe_counter!(
        format!("{}_sync_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Total WordPress sync runs"
    );

    describe_counter!(
        format!("{}_papers_synced_total", METRICS_PREFIX),
        Unit::Count,
        "Total papers upserted by WordPress sync"
    );

    // Mail metrics
    describe_counter!(
        format!("{}_invitations_sent_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviewer invitations sent"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record recommendation metrics
pub fn record_recommendation(result_count: usize) {
    counter!(format!("{}_recommendations_total", METRICS_PREFIX)).increment(1);

    gauge!(format!("{}_recommendation_results_count", METRICS_PREFIX)).set(result_count as f64);
}

/// Helper to record verification metrics
pub fn record_verification(duration_secs: f64, indexed: bool, simulated: bool) {
    counter!(
        format!("{}_verifications_total", METRICS_PREFIX),
        "outcome" => if indexed { "indexed" } else { "not_found" },
        "source" => if simulated { "simulated" } else { "live" }
    )
    .increment(1);

    histogram!(format!("{}_verification_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record sync metrics
pub fn record_sync(papers_synced: usize, fallback: bool) {
    counter!(
        format!("{}_sync_runs_total", METRICS_PREFIX),
        "source" => if fallback { "mock" } else { "live" }
    )
    .increment(1);

    counter!(format!("{}_papers_synced_total", METRICS_PREFIX)).increment(papers_synced as u64);
}

/// Helper to record invitation metrics
pub fn record_invitation(sent: bool) {
    counter!(
        format!("{}_invitations_sent_total", METRICS_PREFIX),
        "mode" => if sent { "smtp" } else { "logged" }
    )
    .increment(1);
}
