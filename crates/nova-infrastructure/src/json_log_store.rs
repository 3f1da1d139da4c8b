//! File-backed conversation log store.

use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use nova_core::error::{NovaError, Result};
use nova_core::session::{ConversationLogStore, Message};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Persists the conversation log as one JSON array in a single file.
///
/// Writes go through [`AtomicJsonFile`], so a crash mid-save leaves either the
/// previous log or the new one on disk, never a torn file.
#[derive(Clone)]
pub struct JsonFileLogStore {
    file: Arc<AtomicJsonFile<Vec<Message>>>,
}

impl JsonFileLogStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl ConversationLogStore for JsonFileLogStore {
    async fn load(&self) -> Vec<Message> {
        let file = Arc::clone(&self.file);
        let loaded = tokio::task::spawn_blocking(move || file.load()).await;

        match loaded {
            Ok(Ok(Some(log))) => {
                tracing::debug!(messages = log.len(), "Loaded conversation log");
                log
            }
            Ok(Ok(None)) => Vec::new(),
            Ok(Err(e)) => {
                tracing::warn!(
                    path = %self.file.path().display(),
                    "Stored conversation log is unreadable, starting empty: {}",
                    e
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Conversation log load task failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn save(&self, log: &[Message]) -> Result<()> {
        let file = Arc::clone(&self.file);
        let log = log.to_vec();
        tokio::task::spawn_blocking(move || file.save(&log))
            .await
            .map_err(|e| NovaError::internal(format!("save task failed: {}", e)))??;
        Ok(())
    }

    async fn erase(&self) -> Result<()> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.remove())
            .await
            .map_err(|e| NovaError::internal(format!("erase task failed: {}", e)))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::session::{MessageId, Sender};
    use tempfile::TempDir;

    fn sample_log() -> Vec<Message> {
        vec![
            Message {
                id: MessageId(1_700_000_000_000),
                sender: Sender::User,
                content: "📄 Uploaded file: report.pdf".to_string(),
            },
            Message {
                id: MessageId(1_700_000_000_001),
                sender: Sender::User,
                content: "Summarize\nplease".to_string(),
            },
            Message {
                id: MessageId(1_700_000_000_002),
                sender: Sender::Assistant,
                content: "Revenue grew 10% \"year over year\".".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileLogStore::new(temp_dir.path().join("chat_history.json"));

        store.save(&sample_log()).await.unwrap();

        assert_eq!(store.load().await, sample_log());
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileLogStore::new(temp_dir.path().join("chat_history.json"));

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_history.json");
        std::fs::write(&path, r#"[{"id": "not a number", "sender": "alien"}"#).unwrap();

        let store = JsonFileLogStore::new(path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_erase_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_history.json");
        let store = JsonFileLogStore::new(path.clone());

        store.save(&sample_log()).await.unwrap();
        store.erase().await.unwrap();
        store.erase().await.unwrap();

        assert!(!path.exists());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_file_uses_persisted_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat_history.json");
        let store = JsonFileLogStore::new(path.clone());

        store.save(&sample_log()[2..]).await.unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], 1_700_000_000_002u64);
        assert_eq!(value[0]["sender"], "bot");
    }
}
