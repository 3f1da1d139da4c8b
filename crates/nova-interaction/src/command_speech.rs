//! Speech recognizers.
//!
//! `CommandSpeechRecognizer` delegates transcription to an external program
//! that listens on the microphone and prints one utterance to stdout.
//! `UnavailableSpeechRecognizer` stands in on platforms without one.

use async_trait::async_trait;
use nova_core::speech::{SpeechError, SpeechRecognizer};
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Runs a transcription command per capture.
///
/// The child is killed when the capture is stopped or its future dropped.
pub struct CommandSpeechRecognizer {
    program: String,
    args: Vec<String>,
    active: Mutex<Option<CancellationToken>>,
}

impl CommandSpeechRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            active: Mutex::new(None),
        }
    }

    /// Builds a recognizer from `[speech] command`; `None` when it is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    fn begin(&self) -> Result<(CancellationToken, ActiveCapture<'_>), SpeechError> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| SpeechError::Failed("recognizer state poisoned".into()))?;
        if active.is_some() {
            return Err(SpeechError::AlreadyListening);
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        Ok((token, ActiveCapture { slot: &self.active }))
    }

    async fn run(&self, token: CancellationToken) -> Result<String, SpeechError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Failed(format!("could not start {}: {}", self.program, e)))?;

        tracing::debug!(program = %self.program, "Speech capture started");

        let output = tokio::select! {
            output = child.wait_with_output() => {
                output.map_err(|e| SpeechError::Failed(e.to_string()))?
            }
            _ = token.cancelled() => {
                tracing::debug!("Speech capture stopped, discarding partial result");
                return Err(SpeechError::Stopped);
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(SpeechError::NoSpeech);
        }
        Ok(transcript)
    }
}

#[async_trait]
impl SpeechRecognizer for CommandSpeechRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    async fn capture(&self) -> Result<String, SpeechError> {
        let (token, _active) = self.begin()?;
        self.run(token).await
    }

    fn stop(&self) {
        if let Ok(active) = self.active.lock() {
            if let Some(token) = active.as_ref() {
                token.cancel();
            }
        }
    }
}

/// Clears the running capture when dropped, including when the capture
/// future itself is dropped mid-run.
struct ActiveCapture<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for ActiveCapture<'_> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.slot.lock() {
            *active = None;
        }
    }
}

/// Recognizer for platforms with no speech capability.
#[derive(Debug, Default, Clone)]
pub struct UnavailableSpeechRecognizer;

#[async_trait]
impl SpeechRecognizer for UnavailableSpeechRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn capture(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn stop(&self) {}
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn shell(script: &str) -> CommandSpeechRecognizer {
        CommandSpeechRecognizer::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_stdout_becomes_transcript() {
        let recognizer = shell("echo '  turn on the lights  '");
        assert_eq!(recognizer.capture().await.unwrap(), "turn on the lights");
    }

    #[tokio::test]
    async fn test_empty_output_is_no_speech() {
        let recognizer = shell("true");
        assert_eq!(recognizer.capture().await, Err(SpeechError::NoSpeech));
    }

    #[tokio::test]
    async fn test_failing_command_is_reported() {
        let recognizer = shell("echo 'mic busy' >&2; exit 3");
        match recognizer.capture().await {
            Err(SpeechError::Failed(message)) => assert!(message.contains("mic busy")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_discards_capture() {
        let recognizer = Arc::new(shell("sleep 30; echo never"));
        let capture = {
            let recognizer = Arc::clone(&recognizer);
            tokio::spawn(async move { recognizer.capture().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        recognizer.stop();

        let result = tokio::time::timeout(Duration::from_secs(5), capture)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(SpeechError::Stopped));
    }

    #[tokio::test]
    async fn test_second_capture_while_running_is_rejected() {
        let recognizer = Arc::new(shell("sleep 30"));
        let first = {
            let recognizer = Arc::clone(&recognizer);
            tokio::spawn(async move { recognizer.capture().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(recognizer.capture().await, Err(SpeechError::AlreadyListening));

        recognizer.stop();
        let _ = first.await;
    }

    #[tokio::test]
    async fn test_dropped_capture_frees_recognizer() {
        let recognizer = shell("sleep 30");
        let abandoned =
            tokio::time::timeout(Duration::from_millis(100), recognizer.capture()).await;
        assert!(abandoned.is_err());

        assert!(recognizer.active.lock().unwrap().is_none());
    }

    #[test]
    fn test_from_command() {
        assert!(CommandSpeechRecognizer::from_command(&[]).is_none());
        let recognizer =
            CommandSpeechRecognizer::from_command(&["whisper-listen".into(), "--lang".into()])
                .unwrap();
        assert_eq!(recognizer.program, "whisper-listen");
        assert_eq!(recognizer.args, vec!["--lang".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_recognizer() {
        let recognizer = UnavailableSpeechRecognizer;
        assert!(!recognizer.is_available());
        assert_eq!(recognizer.capture().await, Err(SpeechError::Unavailable));
    }
}
