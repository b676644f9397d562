//! Error types for VM service calls.

use thiserror::Error;

/// Errors from the VM service.
///
/// None of these are recovered locally — the invocation fails and the
/// next one re-reads provider state fresh.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),
}
