//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GEMINI_API_KEY` - Gemini API key
//!
//! ## Optional
//! - `GEMINI_MODEL` - Gemini model ID (default: gemini-1.5-flash)
//! - `GEMINI_MAX_TOKENS` - Max output tokens per call (default: 256)
//! - `GEMINI_TIMEOUT_SECS` - Provider request timeout (default: 10)
//! - `RECOMMENDATIONS_MAX_ITEMS` - Suggestion cap (default: 5)
//! - `SEARCH_MAX_RESULTS` - Catalog search result cap (default: 20)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 256;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;
const DEFAULT_MAX_SEARCH_RESULTS: usize = 20;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Gemini provider configuration
    pub gemini: GeminiConfig,
    /// Maximum number of recommendation suggestions returned
    pub max_recommendations: usize,
    /// Maximum number of catalog search results returned
    pub max_search_results: usize,
}

/// Gemini API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: SecretString,
    /// Model ID (e.g., gemini-1.5-flash)
    pub model: String,
    /// Max output tokens per generation call
    pub max_output_tokens: u32,
    /// Request timeout; provider calls are never retried
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EngineConfig {
    /// Load configuration from the environment.
    ///
    /// Reads a `.env` file first when present (development convenience),
    /// then the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine in production
        dotenvy::dotenv().ok();

        let api_key = require_env("GEMINI_API_KEY")?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let max_output_tokens =
            parse_env_or("GEMINI_MAX_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?;
        let timeout_secs = parse_env_or("GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let max_recommendations =
            parse_env_or("RECOMMENDATIONS_MAX_ITEMS", DEFAULT_MAX_RECOMMENDATIONS)?;
        let max_search_results = parse_env_or("SEARCH_MAX_RESULTS", DEFAULT_MAX_SEARCH_RESULTS)?;

        Ok(Self {
            gemini: GeminiConfig {
                api_key: SecretString::from(api_key),
                model,
                max_output_tokens,
                timeout: Duration::from_secs(timeout_secs),
            },
            max_recommendations,
            max_search_results,
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}
