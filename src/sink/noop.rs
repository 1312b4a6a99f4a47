// src/sink/noop.rs
//! Sink that discards everything
//!
//! Useful as a safe default destination when metrics should be ignored
//! entirely, and as a baseline in benchmarks.

use crate::sink::interface::{MetricsSink, UserActionCallback};

/// Sink that drops every recorded sample and action.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NoopSink {
    /// Create a new no-op sink
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NoopSink {
    fn record_boolean_histogram(&self, _name: &str, _sample: bool) {}

    fn record_exponential_histogram(
        &self,
        _name: &str,
        _sample: i32,
        _min: i32,
        _max: i32,
        _num_buckets: i32,
    ) {
    }

    fn record_linear_histogram(
        &self,
        _name: &str,
        _sample: i32,
        _min: i32,
        _max: i32,
        _num_buckets: i32,
    ) {
    }

    fn record_sparse_histogram(&self, _name: &str, _sample: i32) {}

    fn record_user_action(&self, _name: &str, _timestamp_ms: i64) {}

    fn add_user_action_observer(&self, _callback: UserActionCallback) {}

    fn remove_user_action_observer(&self, _callback: &UserActionCallback) {}

    fn histogram_total_count(&self, _name: &str) -> u64 {
        0
    }

    fn histogram_value_count(&self, _name: &str, _sample: i32) -> u64 {
        0
    }
}
