//! Unified path management for NoVa configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/nova/              # Config directory (platform config dir + "nova")
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! ├── chat_history.json        # Persisted conversation log
//! └── logs/                    # Application logs
//!     └── nova.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every file NoVa reads or writes.
///
/// `NovaPaths::new(Some(dir))` roots everything at `dir` instead of the
/// platform config directory (used by `--config-dir` and by tests).
#[derive(Debug, Clone)]
pub struct NovaPaths {
    root: PathBuf,
}

impl NovaPaths {
    pub fn new(base_path: Option<&Path>) -> Result<Self, PathError> {
        let root = match base_path {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join("nova"),
        };
        Ok(Self { root })
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> PathBuf {
        self.root.join("secret.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join("chat_history.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// The template holds an empty Gemini key. On Unix the file is created
    /// with mode 600.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to the secret file (existing or newly created)
    /// - `Err(std::io::Error)`: If file creation or permission setting fails
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self.secret_file();

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        use nova_core::config::{DEFAULT_GEMINI_MODEL, GeminiConfig, SecretConfig};

        let template_config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_GEMINI_MODEL.to_string()),
            }),
        };

        let template_json = serde_json::to_string_pretty(&template_config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_are_rooted_at_base() {
        let temp_dir = TempDir::new().unwrap();
        let paths = NovaPaths::new(Some(temp_dir.path())).unwrap();

        assert_eq!(paths.config_file(), temp_dir.path().join("config.toml"));
        assert_eq!(paths.history_file(), temp_dir.path().join("chat_history.json"));
        assert_eq!(paths.logs_dir(), temp_dir.path().join("logs"));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = NovaPaths::new(Some(&temp_dir.path().join("nested"))).unwrap();

        let path = paths.ensure_secret_file().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"api_key\": \"\""));

        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
