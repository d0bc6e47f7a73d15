//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Backend requests (counts and latency per operation)
//! - Board loads (fresh, stale and failed outcomes)

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Backend Metrics
// =============================================================================

/// Backend requests total by operation and result.
pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("kanban_backend_requests_total", "Total backend requests"),
        &["operation", "result"], // result: "success" or an error kind
    )
    .unwrap()
});

/// Backend request duration in seconds.
pub static BACKEND_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "kanban_backend_request_duration_seconds",
            "Duration of backend requests",
        )
        .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Board Metrics
// =============================================================================

/// Board loads total by outcome.
pub static BOARD_LOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("kanban_board_loads_total", "Total board loads"),
        &["outcome"], // "fresh", "stale", "error"
    )
    .unwrap()
});

/// Responses discarded because a newer load was issued.
pub static STALE_RESPONSES_DISCARDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "kanban_stale_responses_discarded_total",
        "Total responses discarded because a newer request was issued",
    )
    .unwrap()
});

/// Tickets returned by the backend per fetch.
pub static TICKETS_FETCHED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "kanban_tickets_fetched",
            "Number of tickets returned per fetch",
        )
        .buckets(vec![0.0, 1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one backend request outcome.
pub fn record_backend_request(operation: &str, result: &str, elapsed: Duration) {
    BACKEND_REQUESTS
        .with_label_values(&[operation, result])
        .inc();
    BACKEND_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(elapsed.as_secs_f64());
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Backend
        Box::new(BACKEND_REQUESTS.clone()),
        Box::new(BACKEND_REQUEST_DURATION.clone()),
        // Board
        Box::new(BOARD_LOADS.clone()),
        Box::new(STALE_RESPONSES_DISCARDED.clone()),
        Box::new(TICKETS_FETCHED.clone()),
    ]
}
