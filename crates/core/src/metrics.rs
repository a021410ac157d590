//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search orchestration (attempts by outcome, cache commits)
//! - The remote search endpoint (request latency)
//! - Feed recomputation

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Search attempts total by outcome.
pub static SEARCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "moviebrowser_search_attempts_total",
            "Total remote search attempts",
        ),
        &["result"], // "success", "failure", "connectivity", "cancelled"
    )
    .unwrap()
});

/// Cache replacements total by source.
pub static CACHE_COMMITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "moviebrowser_cache_commits_total",
            "Total full cache replacements",
        ),
        &["source"], // "search", "favorites_seed"
    )
    .unwrap()
});

// =============================================================================
// Remote Metrics
// =============================================================================

/// Remote search request duration in seconds.
pub static REMOTE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "moviebrowser_remote_request_duration_seconds",
            "Duration of remote search requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["backend"],
    )
    .unwrap()
});

// =============================================================================
// Feed Metrics
// =============================================================================

/// Feed recomputations total.
pub static FEED_RECOMPUTATIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "moviebrowser_feed_recomputations_total",
        "Total feed recomputations",
    )
    .unwrap()
});

/// All core metrics, for registration with a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCH_ATTEMPTS.clone()),
        Box::new(CACHE_COMMITS.clone()),
        Box::new(REMOTE_REQUEST_DURATION.clone()),
        Box::new(FEED_RECOMPUTATIONS.clone()),
    ]
}
