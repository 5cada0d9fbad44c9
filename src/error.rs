//! Engine error taxonomy.
//!
//! Only two conditions surface as `Err` to callers: configuration misuse
//! (rejected before any computation starts) and internal task failures.
//! Everything else the engine handles in-band: empty inputs produce empty
//! results, detector failures fall back (visible via `ClusterStrategy`),
//! and cancellation produces a result flagged `partial`.

use thiserror::Error;

/// Errors returned by the relation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration field failed eager validation.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending config field
        field: &'static str,
        /// Human-readable explanation
        reason: String,
    },

    /// An analysis task panicked or was aborted by the runtime.
    #[error("analysis task failed: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
