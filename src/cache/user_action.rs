// src/cache/user_action.rs
//! Bounded ordered buffer of user actions
//!
//! Absorbs `(name, timestamp)` events while no sink is attached. One global
//! capacity is shared across all action names; when the buffer is full new
//! events are dropped silently and counted. Insertion order is preserved
//! for replay.

use crate::sink::interface::MetricsSink;
use crossbeam::queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// A named, timestamped user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAction {
    /// Action name
    pub name: String,

    /// Caller-supplied timestamp in milliseconds
    pub timestamp_ms: i64,
}

/// Bounded FIFO of user actions, safe for concurrent producers.
///
/// Backed by a lock-free MPMC queue; the pop side is only used by the
/// single-threaded drain, so the buffer order is a consistent linearization
/// of concurrent appends.
pub struct UserActionCache {
    /// Underlying bounded queue
    queue: ArrayQueue<UserAction>,

    /// Actions accepted
    recorded: AtomicU64,

    /// Actions dropped (buffer full)
    dropped: AtomicU64,
}

impl UserActionCache {
    /// Create a cache bounded to `capacity` buffered actions
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            recorded: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Append an action, dropping it silently if the buffer is full
    pub fn record(&self, name: &str, timestamp_ms: i64) {
        let action = UserAction {
            name: name.to_string(),
            timestamp_ms,
        };

        match self.queue.push(action) {
            Ok(()) => {
                self.recorded.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("User action buffer full, dropping {}", name);
            }
        }
    }

    /// Replay every buffered action into `sink`, in recorded order,
    /// leaving the buffer empty.
    pub fn drain_into(&self, sink: &dyn MetricsSink) -> UserActionDrainSummary {
        let mut replayed = 0;

        while let Some(action) = self.queue.pop() {
            sink.record_user_action(&action.name, action.timestamp_ms);
            replayed += 1;
        }

        let summary = UserActionDrainSummary {
            replayed,
            dropped: self.dropped.load(Ordering::Relaxed),
        };

        debug!(
            "Drained {} user actions ({} dropped)",
            summary.replayed, summary.dropped
        );

        summary
    }

    /// Get cache statistics
    pub fn stats(&self) -> UserActionCacheStats {
        UserActionCacheStats {
            recorded: self.recorded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            current_size: self.queue.len(),
            capacity: self.queue.capacity(),
        }
    }

    /// Number of actions currently buffered
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// What a drain replayed and what the cache had dropped before it
#[derive(Debug, Clone, Copy, Default)]
pub struct UserActionDrainSummary {
    /// Actions replayed into the sink
    pub replayed: u64,

    /// Actions dropped at capacity before the drain
    pub dropped: u64,
}

/// User-action cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct UserActionCacheStats {
    /// Total actions accepted
    pub recorded: u64,

    /// Total actions dropped (buffer full)
    pub dropped: u64,

    /// Actions currently buffered
    pub current_size: usize,

    /// Buffer capacity
    pub capacity: usize,
}

impl UserActionCacheStats {
    /// Fraction of recording attempts that were dropped, as a percentage
    pub fn drop_rate(&self) -> f64 {
        let attempts = self.recorded + self.dropped;
        if attempts == 0 {
            0.0
        } else {
            (self.dropped as f64 / attempts as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::memory::InMemorySink;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_append_and_len() {
        let cache = UserActionCache::new(16);
        assert!(cache.is_empty());

        cache.record("OpenSettings", 100);
        cache.record("CloseSettings", 200);

        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_drain_preserves_order() {
        let cache = UserActionCache::new(16);
        let sink = InMemorySink::new();

        cache.record("First", 1);
        cache.record("Second", 2);
        cache.record("Third", 3);

        let summary = cache.drain_into(&sink);
        assert_eq!(summary.replayed, 3);
        assert_eq!(summary.dropped, 0);
        assert!(cache.is_empty());

        let actions = sink.user_actions();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0], UserAction { name: "First".to_string(), timestamp_ms: 1 });
        assert_eq!(actions[1].name, "Second");
        assert_eq!(actions[2].name, "Third");
    }

    #[test]
    fn test_overflow_drops_new() {
        let cache = UserActionCache::new(2);

        cache.record("Kept.A", 1);
        cache.record("Kept.B", 2);
        cache.record("Dropped", 3);

        let stats = cache.stats();
        assert_eq!(stats.recorded, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.current_size, 2);
        assert_eq!(stats.capacity, 2);

        // The buffered entries are the two oldest
        let sink = InMemorySink::new();
        cache.drain_into(&sink);
        let names: Vec<String> = sink.user_actions().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Kept.A".to_string(), "Kept.B".to_string()]);
    }

    #[test]
    fn test_drop_rate() {
        let cache = UserActionCache::new(1);

        cache.record("A", 1);
        cache.record("B", 2);

        let stats = cache.stats();
        assert!((stats.drop_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_appends_account_for_every_attempt() {
        let cache = Arc::new(UserActionCache::new(500));
        let mut handles = vec![];

        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    cache.record(&format!("Action.{}.{}", i, j), j);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.recorded, 500);
        assert_eq!(stats.dropped, 300);
        assert_eq!(stats.current_size, 500);
    }

    #[test]
    fn test_per_thread_order_survives_drain() {
        let cache = Arc::new(UserActionCache::new(1000));
        let mut handles = vec![];

        for i in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..50 {
                    cache.record(&format!("Thread{}", i), j);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let sink = InMemorySink::new();
        cache.drain_into(&sink);

        // Within each producer, timestamps must come back in program order
        for i in 0..4 {
            let name = format!("Thread{}", i);
            let timestamps: Vec<i64> = sink
                .user_actions()
                .into_iter()
                .filter(|a| a.name == name)
                .map(|a| a.timestamp_ms)
                .collect();
            assert_eq!(timestamps, (0..50).collect::<Vec<i64>>());
        }
    }

    #[test]
    fn test_user_action_serialization() {
        let action = UserAction {
            name: "OpenSettings".to_string(),
            timestamp_ms: 1_234,
        };

        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("OpenSettings"));

        let parsed: UserAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }
}
