// src/sink/memory.rs
//! Sink that stores every call in memory
//!
//! Keeps a verbatim log of recorded histogram samples and user actions,
//! in call order, and answers the count accessors from that log. Intended
//! for tests and local debugging, not production volumes.

use crate::cache::histogram::HistogramSpec;
use crate::cache::user_action::UserAction;
use crate::sink::interface::{MetricsSink, UserActionCallback};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded histogram call, as received by [`InMemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramRecord {
    /// Histogram name
    pub name: String,

    /// Shape metadata of the call that recorded this sample
    pub spec: HistogramSpec,

    /// Recorded sample value (booleans stored as 0/1)
    pub sample: i32,
}

/// Sink that retains every recorded call for later inspection.
///
/// Observer registrations are tracked so tests can verify migration, but
/// delivery of user actions to observers is the owning recorder's job;
/// this sink never invokes callbacks itself.
#[derive(Default)]
pub struct InMemorySink {
    /// Histogram calls, in arrival order
    histograms: Mutex<Vec<HistogramRecord>>,

    /// User actions, in arrival order
    user_actions: Mutex<Vec<UserAction>>,

    /// Currently registered observers
    observers: Mutex<Vec<UserActionCallback>>,
}

impl InMemorySink {
    /// Create a new empty in-memory sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every histogram call received so far
    pub fn histogram_records(&self) -> Vec<HistogramRecord> {
        self.histograms.lock().clone()
    }

    /// Snapshot of every user action received so far, in order
    pub fn user_actions(&self) -> Vec<UserAction> {
        self.user_actions.lock().clone()
    }

    /// Number of observers currently registered at this sink
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    fn push(&self, name: &str, spec: HistogramSpec, sample: i32) {
        self.histograms.lock().push(HistogramRecord {
            name: name.to_string(),
            spec,
            sample,
        });
    }
}

impl MetricsSink for InMemorySink {
    fn record_boolean_histogram(&self, name: &str, sample: bool) {
        self.push(name, HistogramSpec::Boolean, i32::from(sample));
    }

    fn record_exponential_histogram(
        &self,
        name: &str,
        sample: i32,
        min: i32,
        max: i32,
        num_buckets: i32,
    ) {
        self.push(name, HistogramSpec::Exponential { min, max, num_buckets }, sample);
    }

    fn record_linear_histogram(&self, name: &str, sample: i32, min: i32, max: i32, num_buckets: i32) {
        self.push(name, HistogramSpec::Linear { min, max, num_buckets }, sample);
    }

    fn record_sparse_histogram(&self, name: &str, sample: i32) {
        self.push(name, HistogramSpec::Sparse, sample);
    }

    fn record_user_action(&self, name: &str, timestamp_ms: i64) {
        self.user_actions.lock().push(UserAction {
            name: name.to_string(),
            timestamp_ms,
        });
    }

    fn add_user_action_observer(&self, callback: UserActionCallback) {
        let mut observers = self.observers.lock();
        if !observers.iter().any(|cb| Arc::ptr_eq(cb, &callback)) {
            observers.push(callback);
        }
    }

    fn remove_user_action_observer(&self, callback: &UserActionCallback) {
        self.observers.lock().retain(|cb| !Arc::ptr_eq(cb, callback));
    }

    fn histogram_total_count(&self, name: &str) -> u64 {
        self.histograms
            .lock()
            .iter()
            .filter(|record| record.name == name)
            .count() as u64
    }

    fn histogram_value_count(&self, name: &str, sample: i32) -> u64 {
        self.histograms
            .lock()
            .iter()
            .filter(|record| record.name == name && record.sample == sample)
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_call_order() {
        let sink = InMemorySink::new();

        sink.record_sparse_histogram("Relay.Code", 200);
        sink.record_boolean_histogram("Relay.Enabled", true);
        sink.record_sparse_histogram("Relay.Code", 404);

        let records = sink.histogram_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sample, 200);
        assert_eq!(records[1].spec, HistogramSpec::Boolean);
        assert_eq!(records[2].sample, 404);
    }

    #[test]
    fn test_count_accessors() {
        let sink = InMemorySink::new();

        sink.record_sparse_histogram("Relay.Code", 200);
        sink.record_sparse_histogram("Relay.Code", 200);
        sink.record_sparse_histogram("Relay.Code", 404);

        assert_eq!(sink.histogram_total_count("Relay.Code"), 3);
        assert_eq!(sink.histogram_value_count("Relay.Code", 200), 2);
        assert_eq!(sink.histogram_value_count("Relay.Code", 404), 1);
        assert_eq!(sink.histogram_total_count("Relay.Other"), 0);
    }

    #[test]
    fn test_user_actions_preserve_order() {
        let sink = InMemorySink::new();

        sink.record_user_action("First", 1);
        sink.record_user_action("Second", 2);

        let actions = sink.user_actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name, "First");
        assert_eq!(actions[1].name, "Second");
    }

    #[test]
    fn test_observer_registration_is_idempotent() {
        let sink = InMemorySink::new();

        let callback: UserActionCallback = Arc::new(|_| {});
        sink.add_user_action_observer(Arc::clone(&callback));
        sink.add_user_action_observer(Arc::clone(&callback));
        assert_eq!(sink.observer_count(), 1);

        sink.remove_user_action_observer(&callback);
        assert_eq!(sink.observer_count(), 0);

        // Removing a callback that is no longer registered is a no-op
        sink.remove_user_action_observer(&callback);
        assert_eq!(sink.observer_count(), 0);
    }
}
