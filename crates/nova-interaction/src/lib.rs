//! Adapters to the outside world: the Gemini completion endpoint and
//! speech recognizers.

pub mod command_speech;
pub mod gemini_api_client;

pub use command_speech::{CommandSpeechRecognizer, UnavailableSpeechRecognizer};
pub use gemini_api_client::GeminiApiClient;
