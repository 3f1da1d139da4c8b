//! In-memory conversation log store.

use async_trait::async_trait;
use nova_core::error::Result;
use nova_core::session::{ConversationLogStore, Message};
use tokio::sync::Mutex;

/// A single string slot holding the serialized log, like a browser's local
/// storage key. Used for `--ephemeral` runs and tests.
#[derive(Default)]
pub struct InMemoryLogStore {
    slot: Mutex<Option<String>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose slot already holds `raw`, parseable or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Returns the raw slot contents.
    pub async fn raw(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }
}

#[async_trait]
impl ConversationLogStore for InMemoryLogStore {
    async fn load(&self) -> Vec<Message> {
        let slot = self.slot.lock().await;
        match slot.as_deref() {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                tracing::warn!("Stored conversation log is unreadable, starting empty: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    async fn save(&self, log: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(log)?;
        *self.slot.lock().await = Some(raw);
        Ok(())
    }

    async fn erase(&self) -> Result<()> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::session::{MessageId, Sender};

    #[tokio::test]
    async fn test_round_trip_and_erase() {
        let store = InMemoryLogStore::new();
        let log = vec![Message {
            id: MessageId(42),
            sender: Sender::Assistant,
            content: "hi".to_string(),
        }];

        store.save(&log).await.unwrap();
        assert_eq!(store.load().await, log);

        store.erase().await.unwrap();
        assert!(store.raw().await.is_none());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_slot_loads_empty() {
        let store = InMemoryLogStore::with_raw("definitely not json");
        assert!(store.load().await.is_empty());
    }
}
