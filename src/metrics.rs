//! Metrics instrumentation for subip-dns.
//!
//! All metrics are prefixed with `subip_dns.`

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Record a handled query.
pub fn record_query(outcome: QueryOutcome, duration: std::time::Duration) {
    let outcome_str = match outcome {
        QueryOutcome::Answered => "answered",
        QueryOutcome::Delegated => "delegated",
        QueryOutcome::Failed => "failed",
    };

    counter!("subip_dns.query.count", "outcome" => outcome_str).increment(1);
    histogram!("subip_dns.query.duration.seconds", "outcome" => outcome_str)
        .record(duration.as_secs_f64());
}

/// Query outcome for metrics.
#[derive(Debug, Clone, Copy)]
pub enum QueryOutcome {
    /// Responded with synthesized address records.
    Answered,
    /// Handed to the next handler in the chain.
    Delegated,
    /// Failed with SERVFAIL.
    Failed,
}

/// Record the number of records synthesized for an answered query.
pub fn record_answers_synthesized(count: usize) {
    histogram!("subip_dns.query.answers_synthesized").record(count as f64);
}

/// Record the number of configured zones (set once at startup).
pub fn record_zones_configured(count: usize) {
    gauge!("subip_dns.zones.configured").set(count as f64);
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
