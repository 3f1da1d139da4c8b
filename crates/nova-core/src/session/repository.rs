//! Conversation log store trait.
//!
//! Defines the interface for persisting the ordered message log.

use super::message::Message;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract durable slot holding the conversation log.
///
/// This trait decouples the conversation controller from the specific
/// storage mechanism (JSON file, in-memory slot, ...).
///
/// # Implementation Notes
///
/// - `load` must never fail: a missing or unparseable slot yields an empty log.
/// - `save` overwrites the whole slot; the last write wins.
/// - `erase` on an absent slot is not an error.
#[async_trait]
pub trait ConversationLogStore: Send + Sync {
    /// Reads the persisted log, degrading to an empty log.
    async fn load(&self) -> Vec<Message>;

    /// Serializes the full log and overwrites the slot.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Log saved successfully
    /// - `Err(_)`: Error occurred during write
    async fn save(&self, log: &[Message]) -> Result<()>;

    /// Removes the slot entirely.
    async fn erase(&self) -> Result<()>;
}
