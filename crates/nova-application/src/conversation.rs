//! Conversation controller.
//!
//! Owns the session and merges every input source (typed text, document
//! uploads, completion replies) into the single ordered log. Each mutation
//! happens under the session lock and is persisted before the lock is
//! released; the completion request itself is awaited without the lock.

use nova_core::completion::{CompletionClient, CompletionReply, CompletionTurn};
use nova_core::config::ConversationSettings;
use nova_core::document::DocumentExtractor;
use nova_core::intent::{IDENTITY_REPLY, is_identity_question};
use nova_core::session::{ConversationLogStore, Message, PendingDocument, Sender, Session};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Prefix of the log entry recorded for an uploaded document.
pub const UPLOAD_NOTICE_PREFIX: &str = "📄 Uploaded file: ";
/// Label separating the user's text from the attached document text.
pub const ATTACHMENT_LABEL: &str = "[Attached Document Content]:";
/// Reply used when the endpoint answered with neither text nor error.
pub const EMPTY_REPLY_FALLBACK: &str = "Error fetching response.";
/// Reply used when no parseable answer could be obtained at all.
pub const COMPLETION_FAILURE_REPLY: &str =
    "❌ Sorry, an error occurred while fetching the response.";

/// Where an assistant reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Answered locally by intent detection.
    Canned,
    /// Text returned by the completion endpoint.
    Remote,
    /// Error message embedded in the endpoint's response.
    ApiError,
    /// Generic fallback after an empty answer or a failed request.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing changed.
    Ignored,
    /// A reply is still awaited; nothing changed.
    Busy,
    /// The user message and its reply were appended.
    Replied {
        user: Message,
        reply: Message,
        source: ReplySource,
    },
    /// The session was reset while the request was in flight; the reply was dropped.
    Discarded { user: Message },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Text extracted and staged for the next request.
    Staged { notice: Message, characters: usize },
    /// Extraction failed; a visible error reply was appended.
    Failed { notice: Message, error: Message },
}

struct ControllerState {
    session: Session,
    /// Bumped by every reset so in-flight replies can detect it.
    epoch: u64,
}

/// Drives one conversation.
///
/// Callers must not submit again while [`is_awaiting_reply`] is true; if they
/// do, the second submit is answered with [`SubmitOutcome::Busy`].
///
/// [`is_awaiting_reply`]: ConversationController::is_awaiting_reply
pub struct ConversationController {
    state: Mutex<ControllerState>,
    log_store: Arc<dyn ConversationLogStore>,
    completion_client: Arc<dyn CompletionClient>,
    document_extractor: Arc<dyn DocumentExtractor>,
    retain_document_context: bool,
}

impl ConversationController {
    /// Creates a controller, hydrating the session from `log_store`.
    pub async fn open(
        log_store: Arc<dyn ConversationLogStore>,
        completion_client: Arc<dyn CompletionClient>,
        document_extractor: Arc<dyn DocumentExtractor>,
        settings: &ConversationSettings,
    ) -> Self {
        let log = log_store.load().await;
        tracing::info!(messages = log.len(), "Conversation session opened");

        Self {
            state: Mutex::new(ControllerState {
                session: Session::hydrate(log),
                epoch: 0,
            }),
            log_store,
            completion_client,
            document_extractor,
            retain_document_context: settings.retain_document_context,
        }
    }

    /// Snapshot of the log.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.session.log().to_vec()
    }

    pub async fn is_awaiting_reply(&self) -> bool {
        self.state.lock().await.session.is_awaiting_reply()
    }

    pub async fn pending_document_name(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .session
            .pending_document()
            .map(|doc| doc.file_name.clone())
    }

    /// Appends the user's text and the assistant's answer to it.
    pub async fn submit_user_text(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let (user, history, epoch) = {
            let mut state = self.state.lock().await;
            if state.session.is_awaiting_reply() {
                tracing::warn!("Submit ignored while a reply is still awaited");
                return SubmitOutcome::Busy;
            }

            let user = state.session.append(Sender::User, text);
            state.session.set_awaiting_reply(true);

            if is_identity_question(text) {
                let reply = state.session.append(Sender::Assistant, IDENTITY_REPLY);
                state.session.set_awaiting_reply(false);
                self.persist(&state.session).await;
                return SubmitOutcome::Replied {
                    user,
                    reply,
                    source: ReplySource::Canned,
                };
            }

            self.persist(&state.session).await;

            let history = build_history(&state.session, text);
            if !self.retain_document_context {
                state.session.clear_pending_document();
            }
            (user, history, state.epoch)
        };

        let (content, source) = match self.completion_client.complete(&history).await {
            Ok(CompletionReply::Text(text)) => (text, ReplySource::Remote),
            Ok(CompletionReply::ApiError(message)) => {
                tracing::warn!("Completion endpoint returned an error: {}", message);
                (message, ReplySource::ApiError)
            }
            Ok(CompletionReply::Empty) => {
                tracing::warn!("Completion response carried no text");
                (EMPTY_REPLY_FALLBACK.to_string(), ReplySource::Fallback)
            }
            Err(e) => {
                tracing::error!("Completion failed: {}", e);
                (COMPLETION_FAILURE_REPLY.to_string(), ReplySource::Fallback)
            }
        };

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::info!("Session was reset during the request, dropping reply");
            return SubmitOutcome::Discarded { user };
        }

        let reply = state.session.append(Sender::Assistant, content);
        state.session.set_awaiting_reply(false);
        self.persist(&state.session).await;

        SubmitOutcome::Replied {
            user,
            reply,
            source,
        }
    }

    /// Records an uploaded document whose text is already extracted.
    ///
    /// The document replaces any earlier one. Blank text leaves nothing to
    /// attach.
    pub async fn record_document_upload(&self, file_name: &str, extracted_text: &str) -> Message {
        let mut state = self.state.lock().await;
        let notice = state
            .session
            .append(Sender::User, format!("{UPLOAD_NOTICE_PREFIX}{file_name}"));
        let text = extracted_text.trim();
        if text.is_empty() {
            state.session.clear_pending_document();
        } else {
            state.session.set_pending_document(PendingDocument {
                file_name: file_name.to_string(),
                text: text.to_string(),
            });
        }
        self.persist(&state.session).await;
        notice
    }

    /// Extracts `bytes` and records the upload.
    ///
    /// On extraction failure the upload notice is followed by a visible
    /// assistant message and the previously staged document is kept.
    pub async fn upload_document(&self, file_name: &str, bytes: &[u8]) -> UploadOutcome {
        match self.document_extractor.extract_text(file_name, bytes).await {
            Ok(text) => {
                let characters = text.trim().chars().count();
                tracing::info!(file_name, characters, "Document staged");
                let notice = self.record_document_upload(file_name, &text).await;
                UploadOutcome::Staged { notice, characters }
            }
            Err(e) => {
                tracing::warn!(file_name, "Document extraction failed: {}", e);
                let mut state = self.state.lock().await;
                let notice = state
                    .session
                    .append(Sender::User, format!("{UPLOAD_NOTICE_PREFIX}{file_name}"));
                let error = state.session.append(
                    Sender::Assistant,
                    format!("❌ Sorry, I couldn't read \"{file_name}\": {e}"),
                );
                self.persist(&state.session).await;
                UploadOutcome::Failed { notice, error }
            }
        }
    }

    /// Merges a speech transcript into the text staged in the input buffer.
    pub fn record_transcribed_speech(staged: &str, transcript: &str) -> String {
        if staged.is_empty() {
            transcript.to_string()
        } else {
            format!("{staged} {transcript}")
        }
    }

    /// Clears the session and erases the persisted log.
    pub async fn reset_session(&self) {
        let mut state = self.state.lock().await;
        state.session.clear();
        state.epoch += 1;
        if let Err(e) = self.log_store.erase().await {
            tracing::warn!("Failed to erase conversation log: {}", e);
        }
        tracing::info!("Conversation session reset");
    }

    async fn persist(&self, session: &Session) {
        if let Err(e) = self.log_store.save(session.log()).await {
            tracing::warn!("Failed to persist conversation log: {}", e);
        }
    }
}

/// Maps the log to completion turns; the last turn carries the pending
/// document, if any.
fn build_history(session: &Session, user_text: &str) -> Vec<CompletionTurn> {
    let mut history: Vec<CompletionTurn> = session.log().iter().map(CompletionTurn::from).collect();

    if let Some(last) = history.last_mut() {
        last.text = match session.pending_document() {
            Some(doc) => format!("{user_text}\n\n{ATTACHMENT_LABEL}\n{}", doc.text),
            None => user_text.to_string(),
        };
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::completion::TurnRole;

    #[test]
    fn test_transcript_merge() {
        assert_eq!(
            ConversationController::record_transcribed_speech("", "hello there"),
            "hello there"
        );
        assert_eq!(
            ConversationController::record_transcribed_speech("Summarize", "the report"),
            "Summarize the report"
        );
    }

    #[test]
    fn test_history_appends_document_to_last_turn_only() {
        let mut session = Session::new();
        session.append(Sender::User, "Hi");
        session.append(Sender::Assistant, "Hello!");
        session.set_pending_document(PendingDocument {
            file_name: "report.pdf".to_string(),
            text: "Revenue grew 10%".to_string(),
        });
        session.append(Sender::User, "Summarize");

        let history = build_history(&session, "Summarize");

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text, "Hi");
        assert_eq!(history[1].role, TurnRole::Model);
        assert_eq!(
            history[2].text,
            "Summarize\n\n[Attached Document Content]:\nRevenue grew 10%"
        );
    }

    #[test]
    fn test_history_without_document_is_verbatim() {
        let mut session = Session::new();
        session.append(Sender::User, "Hi");

        let history = build_history(&session, "Hi");

        assert_eq!(
            history,
            vec![CompletionTurn {
                role: TurnRole::User,
                text: "Hi".to_string()
            }]
        );
    }
}
