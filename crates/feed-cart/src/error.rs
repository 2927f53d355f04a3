//! Cart errors.

use thiserror::Error;

/// Errors raised before a cart transition is dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The payload has no usable product identity.
    #[error("Invalid cart payload: {0}")]
    InvalidPayload(String),
}
