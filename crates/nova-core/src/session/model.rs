//! Session domain model.

use super::message::{Message, MessageId, MessageIdGenerator, Sender};

/// Text extracted from the most recently uploaded document.
///
/// It is merged into outbound requests but never stored as a message itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDocument {
    pub file_name: String,
    pub text: String,
}

/// The full mutable state of one conversation.
///
/// The log is append-only; the only way to shrink it is [`Session::clear`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    log: Vec<Message>,
    pending_document: Option<PendingDocument>,
    awaiting_reply: bool,
    ids: MessageIdGenerator,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session from a previously persisted log.
    pub fn hydrate(log: Vec<Message>) -> Self {
        Self {
            ids: MessageIdGenerator::seeded_from(&log),
            log,
            pending_document: None,
            awaiting_reply: false,
        }
    }

    pub fn log(&self) -> &[Message] {
        &self.log
    }

    pub fn pending_document(&self) -> Option<&PendingDocument> {
        self.pending_document.as_ref()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn set_pending_document(&mut self, document: PendingDocument) {
        self.pending_document = Some(document);
    }

    pub fn clear_pending_document(&mut self) {
        self.pending_document = None;
    }

    /// Appends a new message and returns a copy of it.
    ///
    /// When the id space is used up (a restored log can hold `u64::MAX`), the
    /// log is first renumbered `1..=n` in order.
    pub fn append(&mut self, sender: Sender, content: impl Into<String>) -> Message {
        if self.ids.is_exhausted() {
            for (message, id) in self.log.iter_mut().zip(1..) {
                message.id = MessageId(id);
            }
            self.ids = MessageIdGenerator::seeded_from(&self.log);
        }

        let message = Message {
            id: self.ids.next_id(),
            sender,
            content: content.into(),
        };
        self.log.push(message.clone());
        message
    }

    /// Drops the log, the pending document and the in-flight flag.
    pub fn clear(&mut self) {
        self.log.clear();
        self.pending_document = None;
        self.awaiting_reply = false;
    }
}
