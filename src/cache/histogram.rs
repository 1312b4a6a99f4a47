// src/cache/histogram.rs
//! Per-name bounded histogram cache
//!
//! Absorbs histogram samples while no sink is attached. Each distinct
//! metric name gets its own lazily created histogram holding per-value
//! occurrence counts, capped at a fixed number of samples. Beyond the cap
//! new samples are dropped silently and counted.
//!
//! All counter mutations go through atomics or per-shard map entries, so
//! concurrent recorders never serialize against each other and never lose
//! an increment.

use crate::sink::interface::MetricsSink;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Shape metadata of a histogram, captured from the first recorded sample.
///
/// The cache treats bucket parameters as opaque: they are stored verbatim
/// and replayed with the matching `record_*` call at drain time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramSpec {
    /// Two buckets, samples stored as 0/1
    Boolean,

    /// Exponentially sized buckets
    Exponential { min: i32, max: i32, num_buckets: i32 },

    /// Equally sized buckets
    Linear { min: i32, max: i32, num_buckets: i32 },

    /// One bucket per distinct sample value
    Sparse,
}

impl HistogramSpec {
    /// Issue the `record_*` call matching this shape on `sink`
    pub(crate) fn record_into(self, sink: &dyn MetricsSink, name: &str, sample: i32) {
        match self {
            HistogramSpec::Boolean => sink.record_boolean_histogram(name, sample != 0),
            HistogramSpec::Exponential { min, max, num_buckets } => {
                sink.record_exponential_histogram(name, sample, min, max, num_buckets);
            }
            HistogramSpec::Linear { min, max, num_buckets } => {
                sink.record_linear_histogram(name, sample, min, max, num_buckets);
            }
            HistogramSpec::Sparse => sink.record_sparse_histogram(name, sample),
        }
    }
}

/// Samples cached for one metric name
struct CachedHistogram {
    /// Shape of the first sample recorded under this name
    spec: HistogramSpec,

    /// Sample value → occurrence count
    samples: DashMap<i32, u64>,

    /// Samples accepted; never exceeds the per-name capacity
    total: AtomicU64,

    /// Samples dropped at capacity
    dropped: AtomicU64,
}

impl CachedHistogram {
    fn new(spec: HistogramSpec) -> Self {
        Self {
            spec,
            samples: DashMap::new(),
            total: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }
}

/// Thread-safe bounded cache of histogram samples, keyed by metric name.
pub struct HistogramCache {
    /// Metric name → cached histogram
    histograms: DashMap<String, Arc<CachedHistogram>>,

    /// Maximum number of distinct names retained
    max_histograms: usize,

    /// Maximum samples accepted per name
    sample_capacity: u64,

    /// Samples dropped because the name table was full
    dropped_names: AtomicU64,
}

impl HistogramCache {
    /// Create a cache bounded to `max_histograms` names with
    /// `sample_capacity` samples each.
    pub fn new(max_histograms: usize, sample_capacity: u64) -> Self {
        Self {
            histograms: DashMap::new(),
            max_histograms,
            sample_capacity,
            dropped_names: AtomicU64::new(0),
        }
    }

    /// Record one sample for the named histogram, creating it on first use.
    ///
    /// The shape of the first sample wins; later samples for the same name
    /// are filed under the first-seen shape. At capacity the sample is
    /// dropped and counted.
    pub fn record(&self, name: &str, spec: HistogramSpec, sample: i32) {
        let histogram = if let Some(entry) = self.histograms.get(name) {
            Arc::clone(entry.value())
        } else if self.histograms.len() < self.max_histograms {
            // The len check and the insert are not one atomic step: a burst
            // of first-time names can overshoot the bound by at most the
            // number of racing threads. The per-name sample cap below is
            // strict.
            debug!("Creating cached histogram {}", name);
            Arc::clone(
                self.histograms
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(CachedHistogram::new(spec)))
                    .value(),
            )
        } else {
            self.dropped_names.fetch_add(1, Ordering::Relaxed);
            trace!("Histogram table full, dropping sample for {}", name);
            return;
        };

        // Reserve a slot against the per-name cap before touching the
        // per-value counts, so concurrent recorders can never push `total`
        // past the capacity.
        let reserved = histogram
            .total
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |count| {
                (count < self.sample_capacity).then_some(count + 1)
            });

        if reserved.is_err() {
            histogram.dropped.fetch_add(1, Ordering::Relaxed);
            trace!("Histogram {} at sample capacity, dropping sample", name);
            return;
        }

        *histogram.samples.entry(sample).or_insert(0) += 1;
    }

    /// Total samples accepted for the named histogram (0 if unknown)
    pub fn total_count(&self, name: &str) -> u64 {
        self.histograms
            .get(name)
            .map(|histogram| histogram.total.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Samples with the given value for the named histogram (0 if unknown)
    pub fn value_count(&self, name: &str, sample: i32) -> u64 {
        self.histograms
            .get(name)
            .and_then(|histogram| histogram.samples.get(&sample).map(|count| *count))
            .unwrap_or(0)
    }

    /// Replay every cached sample into `sink` and clear the cache.
    ///
    /// Per-name call multiplicity exactly matches what was recorded;
    /// cross-name order is unspecified.
    pub fn drain_into(&self, sink: &dyn MetricsSink) -> HistogramDrainSummary {
        let mut summary = HistogramDrainSummary::default();

        for entry in self.histograms.iter() {
            let (name, histogram) = (entry.key(), entry.value());

            for sample_entry in histogram.samples.iter() {
                let (value, count) = (*sample_entry.key(), *sample_entry.value());
                for _ in 0..count {
                    histogram.spec.record_into(sink, name, value);
                }
            }

            summary.histograms += 1;
            summary.samples += histogram.total.load(Ordering::Relaxed);

            let dropped = histogram.dropped.load(Ordering::Relaxed);
            summary.dropped_samples += dropped;
            if dropped > 0 {
                summary.full_histograms += 1;
            }
        }

        summary.dropped_samples += self.dropped_names.load(Ordering::Relaxed);
        self.histograms.clear();

        debug!(
            "Drained {} histogram samples across {} histograms ({} dropped)",
            summary.samples, summary.histograms, summary.dropped_samples
        );

        summary
    }

    /// Get cache statistics
    pub fn stats(&self) -> HistogramCacheStats {
        let mut samples = 0;
        let mut dropped_samples = self.dropped_names.load(Ordering::Relaxed);

        for entry in self.histograms.iter() {
            samples += entry.value().total.load(Ordering::Relaxed);
            dropped_samples += entry.value().dropped.load(Ordering::Relaxed);
        }

        HistogramCacheStats {
            histograms: self.histograms.len(),
            samples,
            dropped_samples,
        }
    }

    /// Number of distinct histogram names currently cached
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Check if the cache holds no histograms
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
}

/// What a drain replayed and what the cache had dropped before it
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramDrainSummary {
    /// Distinct histogram names replayed
    pub histograms: u64,

    /// Samples replayed into the sink
    pub samples: u64,

    /// Samples dropped at capacity before the drain
    pub dropped_samples: u64,

    /// Histograms that dropped at least one sample
    pub full_histograms: u64,
}

/// Histogram cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct HistogramCacheStats {
    /// Distinct histogram names cached
    pub histograms: usize,

    /// Samples currently held
    pub samples: u64,

    /// Samples dropped at capacity
    pub dropped_samples: u64,
}
