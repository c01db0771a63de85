//! Error types for the atlas core.

use thiserror::Error;

/// Top-level error type for atlas operations.
///
/// Generation failures never appear here — the pipeline resolves them to
/// fallback content internally. Store failures are the only errors a
/// caller is expected to surface, and even then as a generic retry prompt.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// The profile store could not be reached or rejected the operation.
    #[error("Profile store error: {0}")]
    Store(String),

    /// A place identity normalized to nothing usable.
    #[error("Invalid place identity: '{0}'")]
    InvalidPlace(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AtlasError>;
