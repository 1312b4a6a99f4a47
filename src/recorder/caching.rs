// src/recorder/caching.rs
//! Caching metrics recorder with atomic sink handoff
//!
//! The recorder implements [`MetricsSink`] itself, so callers record
//! against one stable object for the whole process lifetime. Behind it,
//! calls either land in bounded caches (no sink attached yet) or are
//! forwarded synchronously to the attached sink.
//!
//! # Locking protocol
//!
//! A single `parking_lot::RwLock` guards the attachment state:
//!
//! - Every `record_*` call and count accessor holds the **shared** side for
//!   its full duration, including any forwarded sink call. Producers run in
//!   parallel against the lock-free caches.
//! - `set_sink` holds the **exclusive** side, so a swap waits for every
//!   in-flight recording call (including one blocked inside the old sink)
//!   and no recording call can ever observe a half-swapped state. A waiting
//!   swap also blocks new readers, so it cannot starve.
//!
//! User-action observers fire inside the shared section, exactly once per
//! `record_user_action` call, in both states. Observers must therefore not
//! call back into the recorder itself; re-entering the registry alone
//! (add/remove) is safe.

use crate::cache::histogram::{HistogramCache, HistogramCacheStats, HistogramDrainSummary, HistogramSpec};
use crate::cache::user_action::{UserActionCache, UserActionCacheStats, UserActionDrainSummary};
use crate::recorder::observers::ObserverRegistry;
use crate::sink::interface::{MetricsSink, UserActionCallback};
use crate::utils::errors::{RelayError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Metric names under this prefix are the recorder's own cache-pressure
/// diagnostics, recorded into the sink at drain time. Consumers inspecting
/// a sink in tests should filter them out with [`is_internal_metric`].
pub const INTERNAL_METRIC_PREFIX: &str = "MetricsRelay.Cache.";

const INPUT_HISTOGRAM_SAMPLE_COUNT: &str = "MetricsRelay.Cache.InputHistogramSampleCount";
const DROPPED_HISTOGRAM_SAMPLE_COUNT: &str = "MetricsRelay.Cache.DroppedHistogramSampleCount";
const FULL_HISTOGRAM_COUNT: &str = "MetricsRelay.Cache.FullHistogramCount";
const INPUT_USER_ACTION_COUNT: &str = "MetricsRelay.Cache.InputUserActionCount";
const DROPPED_USER_ACTION_COUNT: &str = "MetricsRelay.Cache.DroppedUserActionCount";

/// Check whether a metric name is one of the recorder's own diagnostics
pub fn is_internal_metric(name: &str) -> bool {
    name.starts_with(INTERNAL_METRIC_PREFIX)
}

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Maximum distinct histogram names cached while detached
    pub max_histograms: usize,

    /// Maximum samples cached per histogram name
    pub histogram_sample_capacity: u64,

    /// Maximum user actions buffered while detached (global, all names)
    pub user_action_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_histograms: 256,
            histogram_sample_capacity: 256,
            user_action_capacity: 256,
        }
    }
}

impl RecorderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_histograms == 0 {
            return Err(RelayError::ConfigError(
                "max_histograms must be non-zero".to_string(),
            ));
        }
        if self.histogram_sample_capacity == 0 {
            return Err(RelayError::ConfigError(
                "histogram_sample_capacity must be non-zero".to_string(),
            ));
        }
        if self.user_action_capacity == 0 {
            return Err(RelayError::ConfigError(
                "user_action_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Attachment state, guarded by the recorder's reader-writer lock
enum RecorderState {
    /// No sink yet; calls are absorbed into the caches
    Detached,

    /// Sink attached; calls are forwarded synchronously
    Attached(Arc<dyn MetricsSink>),
}

/// Thread-safe recorder that caches metrics until a sink is attached.
pub struct CachingRecorder {
    /// Current attachment state; shared side for recording, exclusive for swaps
    state: RwLock<RecorderState>,

    /// Histogram samples absorbed while detached
    histograms: HistogramCache,

    /// User actions absorbed while detached
    user_actions: UserActionCache,

    /// Callbacks registered directly on the recorder
    observers: ObserverRegistry,
}

impl CachingRecorder {
    /// Create a recorder with the default cache bounds
    pub fn new() -> Self {
        Self::build(&RecorderConfig::default())
    }

    /// Create a recorder with custom cache bounds
    pub fn with_config(config: RecorderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &RecorderConfig) -> Self {
        debug!("Initializing caching recorder: {:?}", config);

        Self {
            state: RwLock::new(RecorderState::Detached),
            histograms: HistogramCache::new(config.max_histograms, config.histogram_sample_capacity),
            user_actions: UserActionCache::new(config.user_action_capacity),
            observers: ObserverRegistry::new(),
        }
    }

    /// Attach `new_sink`, replacing any previous sink.
    ///
    /// Blocks until every in-flight recording call has finished. On the
    /// first attach, everything cached so far is replayed into `new_sink`
    /// (per-name histogram multiplicities preserved, user actions in
    /// recorded order) followed by the cache-pressure diagnostics. On a
    /// replacement, registered observers are removed from the old sink.
    /// Either way the observers are then added to `new_sink`.
    pub fn set_sink(&self, new_sink: Arc<dyn MetricsSink>) {
        let mut state = self.state.write();

        match &*state {
            RecorderState::Detached => {
                let histograms = self.histograms.drain_into(new_sink.as_ref());
                let user_actions = self.user_actions.drain_into(new_sink.as_ref());
                record_cache_diagnostics(new_sink.as_ref(), &histograms, &user_actions);

                info!(
                    "Attached metrics sink, replayed {} histogram samples and {} user actions",
                    histograms.samples, user_actions.replayed
                );
            }
            RecorderState::Attached(old_sink) => {
                self.observers
                    .for_each(|callback| old_sink.remove_user_action_observer(callback));
                debug!("Replacing metrics sink");
            }
        }

        self.observers
            .for_each(|callback| new_sink.add_user_action_observer(Arc::clone(callback)));
        *state = RecorderState::Attached(new_sink);
    }

    /// Check whether a sink is currently attached
    pub fn is_attached(&self) -> bool {
        matches!(&*self.state.read(), RecorderState::Attached(_))
    }

    /// Get recorder statistics
    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            attached: self.is_attached(),
            histograms: self.histograms.stats(),
            user_actions: self.user_actions.stats(),
        }
    }

    fn record_histogram(&self, name: &str, spec: HistogramSpec, sample: i32) {
        let state = self.state.read();
        match &*state {
            RecorderState::Detached => self.histograms.record(name, spec, sample),
            RecorderState::Attached(sink) => spec.record_into(sink.as_ref(), name, sample),
        }
    }
}

impl Default for CachingRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for CachingRecorder {
    fn record_boolean_histogram(&self, name: &str, sample: bool) {
        self.record_histogram(name, HistogramSpec::Boolean, i32::from(sample));
    }

    fn record_exponential_histogram(
        &self,
        name: &str,
        sample: i32,
        min: i32,
        max: i32,
        num_buckets: i32,
    ) {
        self.record_histogram(name, HistogramSpec::Exponential { min, max, num_buckets }, sample);
    }

    fn record_linear_histogram(&self, name: &str, sample: i32, min: i32, max: i32, num_buckets: i32) {
        self.record_histogram(name, HistogramSpec::Linear { min, max, num_buckets }, sample);
    }

    fn record_sparse_histogram(&self, name: &str, sample: i32) {
        self.record_histogram(name, HistogramSpec::Sparse, sample);
    }

    fn record_user_action(&self, name: &str, timestamp_ms: i64) {
        let state = self.state.read();
        match &*state {
            RecorderState::Detached => self.user_actions.record(name, timestamp_ms),
            RecorderState::Attached(sink) => sink.record_user_action(name, timestamp_ms),
        }

        // Fires exactly once per call, in both states, before the shared
        // lock is released
        self.observers.notify_all(name);
    }

    fn add_user_action_observer(&self, callback: UserActionCallback) {
        let state = self.state.write();
        if let RecorderState::Attached(sink) = &*state {
            sink.add_user_action_observer(Arc::clone(&callback));
        }
        self.observers.add(callback);
    }

    fn remove_user_action_observer(&self, callback: &UserActionCallback) {
        let state = self.state.write();
        if let RecorderState::Attached(sink) = &*state {
            sink.remove_user_action_observer(callback);
        }
        self.observers.remove(callback);
    }

    fn histogram_total_count(&self, name: &str) -> u64 {
        let state = self.state.read();
        match &*state {
            RecorderState::Detached => self.histograms.total_count(name),
            RecorderState::Attached(sink) => sink.histogram_total_count(name),
        }
    }

    fn histogram_value_count(&self, name: &str, sample: i32) -> u64 {
        let state = self.state.read();
        match &*state {
            RecorderState::Detached => self.histograms.value_count(name, sample),
            RecorderState::Attached(sink) => sink.histogram_value_count(name, sample),
        }
    }
}

/// Recorder statistics
#[derive(Debug, Clone, Serialize)]
pub struct RecorderStats {
    /// Whether a sink is currently attached
    pub attached: bool,

    /// Histogram cache statistics
    pub histograms: HistogramCacheStats,

    /// User-action cache statistics
    pub user_actions: UserActionCacheStats,
}

fn record_cache_diagnostics(
    sink: &dyn MetricsSink,
    histograms: &HistogramDrainSummary,
    user_actions: &UserActionDrainSummary,
) {
    sink.record_exponential_histogram(
        INPUT_HISTOGRAM_SAMPLE_COUNT,
        as_sample(histograms.samples),
        1,
        1_000_000,
        50,
    );
    sink.record_exponential_histogram(
        DROPPED_HISTOGRAM_SAMPLE_COUNT,
        as_sample(histograms.dropped_samples),
        1,
        1_000_000,
        50,
    );
    sink.record_linear_histogram(FULL_HISTOGRAM_COUNT, as_sample(histograms.full_histograms), 1, 101, 50);
    sink.record_exponential_histogram(
        INPUT_USER_ACTION_COUNT,
        as_sample(user_actions.replayed),
        1,
        1_000_000,
        50,
    );
    sink.record_exponential_histogram(
        DROPPED_USER_ACTION_COUNT,
        as_sample(user_actions.dropped),
        1,
        1_000_000,
        50,
    );
}

fn as_sample(count: u64) -> i32 {
    count.min(i32::MAX as u64) as i32
}
