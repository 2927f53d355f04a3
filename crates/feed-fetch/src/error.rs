//! Fetch error types.

use feed_data::ProviderError;
use thiserror::Error;

/// Errors that halt pagination for the current term.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No usable response: transport failure, timeout or HTTP error status.
    #[error("Network error: {0}")]
    Network(String),

    /// Well-formed response, but the term has no results at all.
    #[error("No products found for \"{term}\"")]
    EmptyResult { term: String },

    /// Neither the primary nor the fallback item path has the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<ProviderError> for FetchError {
    fn from(e: ProviderError) -> Self {
        if e.is_transport() {
            FetchError::Network(e.to_string())
        } else {
            FetchError::MalformedResponse(e.to_string())
        }
    }
}
