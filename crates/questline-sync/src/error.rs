//! Error types for questline-sync

use thiserror::Error;

/// Errors that can occur during synchronization and view operations
#[derive(Debug, Error)]
pub enum Error {
    /// A persisted snapshot failed to parse or validate
    ///
    /// Recovered by keeping the last-known-good in-memory state (or defaults
    /// on first load); never fatal.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Snapshot serialization failed
    #[error("snapshot codec error: {0}")]
    Codec(String),

    /// A debounced operation was re-triggered before it settled
    #[error("operation already in flight: {0}")]
    OperationInFlight(String),

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] questline_store::Error),

    /// Core error
    #[error(transparent)]
    Core(#[from] questline_core::Error),
}

/// Result type for questline-sync operations
pub type Result<T> = std::result::Result<T, Error>;
