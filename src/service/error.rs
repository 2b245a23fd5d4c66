//! Error taxonomy shared by all catalog operations.

use crate::lookup::LookupError;
use thiserror::Error;

/// Typed failure modes of the song service. The HTTP layer maps these onto
/// response statuses; nothing in the core retries or panics on them.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required input field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// No song matched the requested target.
    #[error("not found: {0}")]
    NotFound(String),

    /// The lookup service failed or answered with a non-success status.
    #[error("lookup failed: {0}")]
    Upstream(#[from] LookupError),

    /// The catalog store failed to read or write.
    #[error("storage failure: {0}")]
    Persistence(#[source] anyhow::Error),

    /// Page or limit outside the valid range.
    #[error("{0}")]
    Boundary(String),
}
