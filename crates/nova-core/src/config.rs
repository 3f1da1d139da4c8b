//! Configuration model.
//!
//! `AppConfig` mirrors `config.toml`; every key is optional and falls back to
//! the defaults below. Credentials live separately in `SecretConfig`
//! (`secret.json`) and are never part of `AppConfig`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub completion: CompletionSettings,
    pub conversation: ConversationSettings,
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Gemini model name, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Base URL of the `models` collection; the model and method are appended.
    pub base_url: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// Keep re-sending the last uploaded document with every later message.
    pub retain_document_context: bool,
    /// Overrides the default history file location.
    pub history_file: Option<PathBuf>,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            retain_document_context: true,
            history_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Program and arguments of an external transcriber that prints one
    /// utterance on stdout. Empty means speech input is unavailable.
    pub command: Vec<String>,
}

/// Provider credentials stored in `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.completion.model, DEFAULT_GEMINI_MODEL);
        assert!(config.conversation.retain_document_context);
        assert!(config.speech.command.is_empty());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_keys() {
        let config: AppConfig = toml::from_str(
            r#"
            [conversation]
            retain_document_context = false

            [speech]
            command = ["whisper-listen", "--lang", "en-US"]
            "#,
        )
        .unwrap();

        assert!(!config.conversation.retain_document_context);
        assert_eq!(config.completion.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.speech.command.len(), 3);
    }
}
