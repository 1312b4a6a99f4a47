// src/cache/mod.rs
//! Bounded in-memory caches for unattached recording
//!
//! While no sink is attached, recorded metrics are absorbed here:
//!
//! - **Histogram Cache**: Per-name bounded multiset of samples
//! - **User-Action Cache**: Single bounded FIFO of (name, timestamp) events
//!
//! Both caches are safe for arbitrarily many concurrent writers and are
//! drained exactly once, when a sink is attached.
//!
//! # Architecture
//!
//! ```text
//! record_*()  →  HistogramCache   ──┐
//!                 (per-name counts) │   drain_into(sink)
//!                                   ├──────────────────→  MetricsSink
//! record_user_action() → UserActionCache ──┘
//!                 (ordered, global cap)
//! ```

pub mod histogram;
pub mod user_action;

// Re-export commonly used types
pub use histogram::{HistogramCache, HistogramCacheStats, HistogramDrainSummary, HistogramSpec};
pub use user_action::{UserAction, UserActionCache, UserActionCacheStats, UserActionDrainSummary};
