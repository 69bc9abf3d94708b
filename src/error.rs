//! Error taxonomy for the scoring core.
//!
//! None of these are retried inside the core; each is a typed failure
//! surfaced to the caller, which owns retry/backoff policy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Latitude/longitude outside valid range. Rejected at ingestion.
    #[error("coordinate out of range: lat={lat}, long={long}")]
    InvalidCoordinate { lat: f64, long: f64 },

    /// A recognized feature is missing, non-finite, or malformed.
    /// Rejected before scoring; never silently imputed.
    #[error("feature schema violation: {0}")]
    SchemaViolation(String),

    /// The preprocessor or scorer collaborator is not ready.
    /// Retryable from the caller's side; not fatal to the process.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The scorer call exceeded its deadline. The timeline append made
    /// before the call remains intact.
    #[error("scorer call exceeded {deadline_ms}ms deadline")]
    UpstreamTimeout { deadline_ms: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
