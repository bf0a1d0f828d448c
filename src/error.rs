//! Error types for desaka-unifier

use thiserror::Error;

/// Common result type for unifier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types across the attribute resolution engine
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Memory namespace file could not be read or written as CSV
    #[error("Memory file error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A namespace file could not be persisted at all.
    ///
    /// Run-fatal: an unpersisted resolution risks being re-asked from the
    /// AI oracle at cost.
    #[error("Storage error: {0}")]
    Storage(String),

    /// AI oracle call failed (network, timeout, malformed reply)
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Human confirmation channel failed
    #[error("Confirmation error: {0}")]
    Confirmation(String),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}
