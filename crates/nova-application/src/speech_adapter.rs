use nova_core::speech::{SpeechError, SpeechRecognizer};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Tracks the listening state on top of a [`SpeechRecognizer`].
///
/// At most one capture runs at a time. Each capture gets its own cancellation
/// token, so a stop issued before the recognizer has started still ends it.
/// Dropping the adapter stops any capture still in progress.
pub struct SpeechCaptureAdapter {
    recognizer: Arc<dyn SpeechRecognizer>,
    active: Mutex<Option<CancellationToken>>,
}

impl SpeechCaptureAdapter {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer,
            active: Mutex::new(None),
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_available()
    }

    pub fn is_listening(&self) -> bool {
        self.active.lock().map(|active| active.is_some()).unwrap_or(false)
    }

    /// Captures one utterance.
    ///
    /// # Returns
    ///
    /// The final transcript, or the reason no transcript was produced.
    pub async fn listen(&self) -> Result<String, SpeechError> {
        if !self.recognizer.is_available() {
            return Err(SpeechError::Unavailable);
        }

        let token = {
            let mut active = self
                .active
                .lock()
                .map_err(|_| SpeechError::Failed("speech state poisoned".into()))?;
            if active.is_some() {
                return Err(SpeechError::AlreadyListening);
            }
            let token = CancellationToken::new();
            *active = Some(token.clone());
            token
        };

        tracing::info!("Listening for speech");
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(SpeechError::Stopped),
            result = self.recognizer.capture() => result,
        };

        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }

        match &result {
            Ok(transcript) => tracing::info!(chars = transcript.len(), "Speech transcribed"),
            Err(e) => tracing::info!("Speech capture ended without transcript: {}", e),
        }
        result
    }

    /// Stops an in-progress capture; its partial result is discarded.
    pub fn stop(&self) {
        if let Ok(active) = self.active.lock() {
            if let Some(token) = active.as_ref() {
                token.cancel();
                self.recognizer.stop();
            }
        }
    }
}

impl Drop for SpeechCaptureAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}
