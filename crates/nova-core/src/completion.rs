//! Remote completion contract.
//!
//! The conversation controller talks to the generative-language API through
//! [`CompletionClient`], so tests can substitute a fake.

use crate::session::{Message, Sender};
use async_trait::async_trait;
use thiserror::Error;

/// Role of one turn in an outbound completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

impl From<Sender> for TurnRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => TurnRole::User,
            Sender::Assistant => TurnRole::Model,
        }
    }
}

/// One role-tagged entry of the outbound history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionTurn {
    pub role: TurnRole,
    pub text: String,
}

impl From<&Message> for CompletionTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.sender.into(),
            text: message.content.clone(),
        }
    }
}

/// What the endpoint answered, once the body has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReply {
    /// Reply text found at the candidate path.
    Text(String),
    /// No candidate text, but the body carried an error message.
    ApiError(String),
    /// Neither reply text nor error message present.
    Empty,
}

/// Failures that prevented a parseable response from being obtained.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedBody(String),

    #[error("completion request could not be built: {0}")]
    InvalidRequest(String),
}

/// A single request/response round trip to the completion endpoint.
///
/// No streaming and no retry: implementations issue exactly one request.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, history: &[CompletionTurn])
    -> Result<CompletionReply, CompletionError>;
}
