// src/utils/errors.rs
//! Error types for the metrics relay
//!
//! Recording operations are fire-and-forget and never fail; errors only
//! surface from configuration validation.

use thiserror::Error;

/// Errors produced by this crate
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid recorder configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
