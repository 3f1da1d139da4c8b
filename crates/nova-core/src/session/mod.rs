//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: Log entries (`Message`, `Sender`, `MessageId`)
//! - `model`: Conversation state (`Session`, `PendingDocument`)
//! - `repository`: Persistence trait for the log (`ConversationLogStore`)

mod message;
mod model;
mod repository;

pub use message::{Message, MessageId, MessageIdGenerator, Sender};
pub use model::{PendingDocument, Session};
pub use repository::ConversationLogStore;
