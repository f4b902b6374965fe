//! Unified error handling for the engine.
//!
//! Provider failures are deliberately absent here: they are always absorbed
//! inside the interpreter, resolver, and recommendation engines and
//! converted into deterministic fallback paths. Only validation and
//! not-found conditions (plus backend failures) surface to callers, each
//! carrying a human-readable message with no internal detail.

use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type for the shopping engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or invalid input (absent user id, non-positive quantity,
    /// missing item name, non-positive price).
    #[error("validation error: {0}")]
    Validation(String),

    /// Item, entry, or product absent for the given key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage backend failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Build a validation error from a displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a not-found error from a displayable message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
