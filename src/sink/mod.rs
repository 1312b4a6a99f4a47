// src/sink/mod.rs
//! Metric sink interface and reference implementations
//!
//! A sink is any destination for recorded metrics:
//!
//! - **MetricsSink**: The capability set every destination implements
//! - **NoopSink**: Discards everything (safe default)
//! - **InMemorySink**: Stores every call in memory (testing, debugging)
//!
//! Sinks receive either live calls (forwarded by an attached recorder) or
//! replayed calls (drained from the recorder's caches at attach time).

pub mod interface;
pub mod memory;
pub mod noop;

// Re-export commonly used types
pub use interface::{MetricsSink, UserActionCallback};
pub use memory::{HistogramRecord, InMemorySink};
pub use noop::NoopSink;
