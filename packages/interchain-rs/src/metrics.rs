//! Prometheus metrics for the mainchain witness
//!
//! Registered in the default registry; the witness binary serves them on
//! `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Encoder, Gauge,
    GaugeVec, TextEncoder,
};

use crate::events::EventType;

lazy_static! {
    pub static ref EVENTS_WITNESSED: CounterVec = register_counter_vec!(
        "witness_events_witnessed_total",
        "Total number of inter-chain events inserted into the cache",
        &["event_type"]
    ).unwrap();

    pub static ref LOGS_SKIPPED: CounterVec = register_counter_vec!(
        "witness_logs_skipped_total",
        "Logs that decoded but failed denom or chain ID validation",
        &["event_type"]
    ).unwrap();

    pub static ref POLL_FAILURES: CounterVec = register_counter_vec!(
        "witness_poll_failures_total",
        "Poll cycles aborted before the cursor advanced",
        &["event_type"]
    ).unwrap();

    pub static ref LAST_QUERIED_HEIGHT: GaugeVec = register_gauge_vec!(
        "witness_last_queried_height",
        "Mainchain height up to which logs have been scanned",
        &["event_type"]
    ).unwrap();

    pub static ref MAINCHAIN_HEIGHT: Gauge = register_gauge!(
        "witness_mainchain_height",
        "Latest mainchain block height seen by the witness"
    ).unwrap();

    pub static ref UP: Gauge = register_gauge!(
        "witness_up",
        "Whether the witness is up and running"
    ).unwrap();
}

fn label(event_type: EventType) -> String {
    event_type.code().to_string()
}

pub fn record_event_witnessed(event_type: EventType) {
    EVENTS_WITNESSED
        .with_label_values(&[label(event_type).as_str()])
        .inc();
}

pub fn record_log_skipped(event_type: EventType) {
    LOGS_SKIPPED.with_label_values(&[label(event_type).as_str()]).inc();
}

pub fn record_poll_failure(event_type: EventType) {
    POLL_FAILURES.with_label_values(&[label(event_type).as_str()]).inc();
}

pub fn set_last_queried_height(event_type: EventType, height: u64) {
    LAST_QUERIED_HEIGHT
        .with_label_values(&[label(event_type).as_str()])
        .set(height as f64);
}

pub fn set_mainchain_height(height: u64) {
    MAINCHAIN_HEIGHT.set(height as f64);
}

/// Text exposition of every registered metric
pub fn gather() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let _ = encoder.encode(&metric_families, &mut buffer);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_includes_witness_metrics() {
        record_event_witnessed(EventType::TFuelTokenLock);
        set_last_queried_height(EventType::TFuelTokenLock, 42);
        let text = String::from_utf8(gather()).unwrap();
        assert!(text.contains("witness_events_witnessed_total"));
        assert!(text.contains("witness_last_queried_height"));
    }
}
