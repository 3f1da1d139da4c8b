//! Application layer: the conversation controller and the speech capture
//! adapter that feed the single conversation log.

pub mod conversation;
pub mod speech_adapter;

pub use conversation::{ConversationController, ReplySource, SubmitOutcome, UploadOutcome};
pub use speech_adapter::SpeechCaptureAdapter;
