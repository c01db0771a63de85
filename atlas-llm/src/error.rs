//! Generation error types.

use thiserror::Error;

/// Errors that can occur while producing a scenario.
///
/// None of these reach the pipeline's caller — every variant either
/// triggers a retry or resolves to fallback content.
#[derive(Debug, Error)]
pub enum GenError {
    /// HTTP request failed.
    #[error("Generator request failed: {0}")]
    RequestFailed(String),

    /// Response was not valid JSON.
    #[error("Failed to parse generator response as JSON: {0}")]
    ParseError(String),

    /// Response parsed but failed the structural gate.
    #[error("Generated content rejected: {0}")]
    InvalidContent(String),

    /// Request timed out.
    #[error("Generator request timed out after {0}ms")]
    Timeout(u64),

    /// No upstream is configured or it cannot be reached.
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts exhausted.
    #[error("All generation attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The error from the final attempt.
        last_error: String,
    },

    /// Configuration error.
    #[error("Generator configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenError::Timeout(0)
        } else if err.is_connect() {
            GenError::Unavailable(err.to_string())
        } else {
            GenError::RequestFailed(err.to_string())
        }
    }
}
