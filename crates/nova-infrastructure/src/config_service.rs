//! Configuration service implementation.
//!
//! Loads `AppConfig` from `config.toml`. A missing or empty file yields the
//! defaults; a malformed file is a configuration error.

use nova_core::config::AppConfig;
use nova_core::error::{NovaError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            NovaError::config(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_reads_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [completion]
            model = "gemini-2.5-pro"

            [conversation]
            history_file = "/tmp/nova-history.json"
            "#,
        )
        .unwrap();

        let config = ConfigService::new(path).load().unwrap();
        assert_eq!(config.completion.model, "gemini-2.5-pro");
        assert_eq!(
            config.conversation.history_file,
            Some(PathBuf::from("/tmp/nova-history.json"))
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[completion\nmodel = ").unwrap();

        let err = ConfigService::new(path).load().unwrap_err();
        assert!(err.is_config());
    }
}
