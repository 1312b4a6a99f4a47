// src/recorder/mod.rs
//! The caching recorder core
//!
//! This module provides the component that front-ends a metrics sink:
//!
//! - **Caching Recorder**: Routes record calls to a sink when one is
//!   attached, otherwise absorbs them into bounded caches; swaps sinks
//!   atomically with drain-and-replay
//! - **Observer Registry**: User-action callbacks registered directly on
//!   the recorder, independent of whatever sink is attached
//!
//! # Architecture
//!
//! ```text
//!  callers (any thread)
//!        │ record_*()            shared lock ──┐
//!        ▼                                     │
//!  CachingRecorder ── Detached ──→ caches      │ RwLock
//!        │            Attached ──→ sink        │
//!        │ set_sink()           exclusive lock ┘
//!        ▼
//!  drain caches → replay into new sink → forward directly
//! ```

pub mod caching;
pub mod observers;

// Re-export commonly used types
pub use caching::{
    is_internal_metric, CachingRecorder, RecorderConfig, RecorderStats, INTERNAL_METRIC_PREFIX,
};
pub use observers::ObserverRegistry;
