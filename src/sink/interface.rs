// src/sink/interface.rs
//! The recording capability set
//!
//! Every metrics destination (the relay itself, the no-op default, or a
//! bridge to an external metrics service) implements [`MetricsSink`]. The
//! trait is object-safe so sinks can be swapped behind `Arc<dyn MetricsSink>`
//! at runtime.

use std::sync::Arc;

/// Callback invoked with the name of every recorded user action.
///
/// Identity is the `Arc` allocation: registering the same `Arc` twice is a
/// no-op, and removal compares with [`Arc::ptr_eq`].
pub type UserActionCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A destination for recorded metrics.
///
/// All operations must be safe to call from any thread. Recording calls are
/// fire-and-forget: they return nothing and must not panic for normal input.
/// Bucket parameters (`min`, `max`, `num_buckets`) are passed through
/// opaquely; validation, if any, is the implementer's concern.
///
/// The count accessors exist for tests and debugging; implementations that
/// do not retain per-value counts may return zero.
pub trait MetricsSink: Send + Sync {
    /// Record a boolean sample (stored as 0/1) for the named histogram.
    fn record_boolean_histogram(&self, name: &str, sample: bool);

    /// Record a sample for a histogram with exponentially sized buckets.
    fn record_exponential_histogram(
        &self,
        name: &str,
        sample: i32,
        min: i32,
        max: i32,
        num_buckets: i32,
    );

    /// Record a sample for a histogram with equally sized buckets.
    fn record_linear_histogram(&self, name: &str, sample: i32, min: i32, max: i32, num_buckets: i32);

    /// Record a sample for a histogram with one bucket per distinct value.
    fn record_sparse_histogram(&self, name: &str, sample: i32);

    /// Record a named user action with a caller-supplied millisecond timestamp.
    fn record_user_action(&self, name: &str, timestamp_ms: i64);

    /// Register a callback for user actions recorded at this sink.
    ///
    /// Adding a callback that is already registered is a no-op.
    fn add_user_action_observer(&self, callback: UserActionCallback);

    /// Remove a previously registered callback.
    ///
    /// Removing a callback that was never added is a no-op.
    fn remove_user_action_observer(&self, callback: &UserActionCallback);

    /// Total number of samples recorded for the named histogram.
    fn histogram_total_count(&self, name: &str) -> u64;

    /// Number of samples with the given value recorded for the named histogram.
    fn histogram_value_count(&self, name: &str, sample: i32) -> u64;
}
