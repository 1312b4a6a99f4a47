// src/lib.rs
//! Metrics Relay Library
//!
//! This library provides a thread-safe caching metrics recorder: callers
//! record histogram samples and user actions against one stable object,
//! which buffers everything in bounded caches until a downstream sink is
//! attached, then hands off atomically and forwards directly.
//!
//! # Architecture
//!
//! The crate is structured into several key modules:
//!
//! - **sink**: The recording capability set and reference sinks (no-op,
//!   in-memory)
//! - **cache**: Bounded thread-safe buffers used while no sink is attached
//! - **recorder**: The caching recorder core and its observer registry
//! - **utils**: Errors and common helpers
//!
//! # Guarantees
//!
//! - No sample or action is lost or duplicated by a sink swap
//! - Per-name histogram multiplicities and user-action order survive the
//!   drain-and-replay handoff
//! - A swap never completes while any recording call is in flight, and no
//!   recording call ever observes a half-swapped sink

// Public module exports
pub mod cache;
pub mod recorder;
pub mod sink;
pub mod utils;

// Re-export commonly used types
pub use recorder::caching::{
    is_internal_metric, CachingRecorder, RecorderConfig, RecorderStats, INTERNAL_METRIC_PREFIX,
};
pub use sink::interface::{MetricsSink, UserActionCallback};
pub use sink::memory::InMemorySink;
pub use sink::noop::NoopSink;
pub use utils::errors::{RelayError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
