//! Conversation message types.
//!
//! Messages are immutable once created and only ever appended to a session
//! log. Their serialized form is the persisted history layout:
//! `{ "id": number, "sender": "user" | "bot", "content": string }`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, strictly increasing identifier of a message within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    /// Message typed, spoken or uploaded by the user.
    #[serde(rename = "user")]
    User,
    /// Reply produced by the assistant (remote or canned).
    #[serde(rename = "bot")]
    Assistant,
}

/// A single entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
}

impl Message {
    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}

/// Issues message ids derived from the wall clock in milliseconds.
///
/// Ids never repeat and never decrease: when the clock yields a value that is
/// not greater than the last issued id, the last id plus one is used instead.
/// Once `u64::MAX` has been issued the generator is exhausted; see
/// [`Session::append`].
///
/// [`Session::append`]: super::Session::append
#[derive(Debug, Clone, Default)]
pub struct MessageIdGenerator {
    last: Option<u64>,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the generator so that new ids follow every id in `log`.
    pub fn seeded_from(log: &[Message]) -> Self {
        Self {
            last: log.iter().map(|m| m.id.0).max(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.last == Some(u64::MAX)
    }

    pub fn next_id(&mut self) -> MessageId {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_after_clock(now)
    }

    fn next_after_clock(&mut self, clock_millis: u64) -> MessageId {
        let id = match self.last {
            Some(last) if clock_millis <= last => last.saturating_add(1),
            _ => clock_millis,
        };
        self.last = Some(id);
        MessageId(id)
    }
}
