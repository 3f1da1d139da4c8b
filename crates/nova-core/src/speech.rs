//! Speech recognition contract.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech recognition is not supported on this platform.")]
    Unavailable,

    #[error("speech capture is already running")]
    AlreadyListening,

    #[error("speech capture was stopped")]
    Stopped,

    #[error("no speech was recognized")]
    NoSpeech,

    #[error("speech recognition failed: {0}")]
    Failed(String),
}

/// Handle to a platform speech recognizer.
///
/// `capture` resolves with one utterance. `stop` ends an in-progress capture,
/// discarding any partial result; the pending `capture` then returns
/// [`SpeechError::Stopped`].
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    async fn capture(&self) -> Result<String, SpeechError>;

    fn stop(&self);
}
