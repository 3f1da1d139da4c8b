//! Domain layer for NoVa.
//!
//! Holds the conversation model and the narrow collaborator traits the
//! application layer is built against.

pub mod completion;
pub mod config;
pub mod document;
pub mod error;
pub mod intent;
pub mod secret;
pub mod session;
pub mod speech;

// Re-export common error type
pub use error::NovaError;
