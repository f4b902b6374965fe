//! Generative text provider boundary.
//!
//! The provider is a stateless text-completion service treated as untrusted
//! and unreliable: its output is always validated against ground truth (the
//! live catalog or a strict JSON shape) before use, and any failure degrades
//! the caller to a deterministic fallback. Calls are bounded by an explicit
//! timeout and are never retried.

pub mod error;
pub mod gemini;

pub use error::ProviderError;
pub use gemini::GeminiClient;

/// Stateless text-completion call.
///
/// Implementations must bound each call with a timeout; callers treat any
/// error as total failure and fall back to deterministic logic.
pub trait TextProvider {
    /// Generate a completion for the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-success status,
    /// or a response body that does not carry the expected text payload.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}
