// src/recorder/observers.rs
//! Registry of user-action observers
//!
//! Holds the callbacks registered directly on the recorder. Membership is
//! keyed by callback identity (`Arc::ptr_eq`): adding a callback twice is a
//! no-op, as is removing one that was never added.
//!
//! Notification takes a snapshot of the membership and invokes the
//! callbacks outside the registry lock, so a callback may re-enter
//! `add`/`remove` without deadlocking.

use crate::sink::interface::UserActionCallback;
use parking_lot::Mutex;
use std::sync::Arc;

/// Identity-keyed set of user-action callbacks.
#[derive(Default)]
pub struct ObserverRegistry {
    /// Registered callbacks, in registration order
    callbacks: Mutex<Vec<UserActionCallback>>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; a no-op if it is already registered
    pub fn add(&self, callback: UserActionCallback) {
        let mut callbacks = self.callbacks.lock();
        if !callbacks.iter().any(|cb| Arc::ptr_eq(cb, &callback)) {
            callbacks.push(callback);
        }
    }

    /// Remove a callback; a no-op if it was never registered
    pub fn remove(&self, callback: &UserActionCallback) {
        self.callbacks.lock().retain(|cb| !Arc::ptr_eq(cb, callback));
    }

    /// Invoke every registered callback with the action name, exactly once each
    pub fn notify_all(&self, name: &str) {
        let snapshot = self.callbacks.lock().clone();
        for callback in &snapshot {
            callback(name);
        }
    }

    /// Visit every registered callback (for sink-side migration)
    pub fn for_each(&self, mut f: impl FnMut(&UserActionCallback)) {
        let snapshot = self.callbacks.lock().clone();
        for callback in &snapshot {
            f(callback);
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback() -> (UserActionCallback, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let callback: UserActionCallback = {
            let count = Arc::clone(&count);
            Arc::new(move |_name| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        (callback, count)
    }

    #[test]
    fn test_add_is_idempotent() {
        let registry = ObserverRegistry::new();
        let (callback, count) = counting_callback();

        registry.add(Arc::clone(&callback));
        registry.add(Arc::clone(&callback));
        assert_eq!(registry.len(), 1);

        registry.notify_all("Action");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_never_added_is_noop() {
        let registry = ObserverRegistry::new();
        let (registered, _) = counting_callback();
        let (stranger, _) = counting_callback();

        registry.add(registered);
        registry.remove(&stranger);
        assert_eq!(registry.len(), 1);

        // Double removal is also a no-op
        registry.remove(&stranger);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_notify_reaches_every_callback_once() {
        let registry = ObserverRegistry::new();
        let (first, first_count) = counting_callback();
        let (second, second_count) = counting_callback();

        registry.add(first);
        registry.add(second);

        registry.notify_all("Action");
        registry.notify_all("Action");

        assert_eq!(first_count.load(Ordering::SeqCst), 2);
        assert_eq!(second_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_may_reenter_registry() {
        let registry = Arc::new(ObserverRegistry::new());
        let (late, late_count) = counting_callback();

        let adder: UserActionCallback = {
            let registry = Arc::clone(&registry);
            let late = Arc::clone(&late);
            Arc::new(move |_name| {
                registry.add(Arc::clone(&late));
            })
        };

        registry.add(adder);

        // First notification sees only the adder; the late callback joins
        // after the snapshot was taken
        registry.notify_all("Action");
        assert_eq!(late_count.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 2);

        registry.notify_all("Action");
        assert_eq!(late_count.load(Ordering::SeqCst), 1);
    }
}
