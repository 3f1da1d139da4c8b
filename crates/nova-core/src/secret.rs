//! Secret management service trait.
//!
//! Defines the interface for loading secret configuration (API keys).

use crate::config::SecretConfig;
use crate::error::Result;

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
/// - Secrets are never compiled into the binary
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// Error messages must not contain secret values.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Returns the Gemini API key, or a `Security` error naming where to put it.
    async fn gemini_api_key(&self) -> Result<String>;
}
