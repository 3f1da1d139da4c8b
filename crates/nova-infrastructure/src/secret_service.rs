//! Secret service implementation.
//!
//! Reads the Gemini credential from `secret.json`, with an optional override
//! taken from the `NOVA_GEMINI_API_KEY` environment variable.

use nova_core::config::{GeminiConfig, SecretConfig};
use nova_core::error::{NovaError, Result};
use nova_core::secret::SecretService;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Environment variable that takes precedence over `secret.json`.
pub const API_KEY_ENV_VAR: &str = "NOVA_GEMINI_API_KEY";

/// Service for loading secret configuration.
///
/// The parsed file is cached after the first successful read.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    env_api_key: Option<String>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    /// Creates a service reading `path` and nothing else.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            env_api_key: None,
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading `path`, overridden by [`API_KEY_ENV_VAR`].
    pub fn from_environment(path: PathBuf) -> Self {
        let env_api_key = std::env::var(API_KEY_ENV_VAR).ok();
        Self::new(path).with_api_key_override(env_api_key)
    }

    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        self.env_api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig> {
        if let Ok(read_lock) = self.secrets.read() {
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                // serde_json reports the position only, never the offending value
                NovaError::security(format!("{} is not valid JSON: {}", self.path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => SecretConfig::default(),
            Err(e) => {
                return Err(NovaError::security(format!(
                    "Cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if let Ok(mut write_lock) = self.secrets.write() {
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        let mut secrets = self.load_secrets_internal()?;
        if let Some(ref key) = self.env_api_key {
            let model_name = secrets.gemini.and_then(|g| g.model_name);
            secrets.gemini = Some(GeminiConfig {
                api_key: key.clone(),
                model_name,
            });
        }
        Ok(secrets)
    }

    async fn gemini_api_key(&self) -> Result<String> {
        let secrets = self.load_secrets().await?;
        secrets
            .gemini
            .map(|g| g.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                NovaError::security(format!(
                    "No Gemini API key configured. Set \"gemini.api_key\" in {} or export {}",
                    self.path.display(),
                    API_KEY_ENV_VAR
                ))
            })
    }
}
