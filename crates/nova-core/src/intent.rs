//! Local intent detection.
//!
//! Some questions are answered without calling the completion API.

/// Phrases that identify a question about the assistant's identity.
pub const IDENTITY_PHRASES: &[&str] = &[
    "what is your name",
    "who are you",
    "tell me your name",
    "may i know your name",
    "your name",
    "name?",
];

/// Fixed reply to identity questions.
pub const IDENTITY_REPLY: &str = "🤖 My name is NoVa — your AI assistant!";

/// Returns true when `text` (case-insensitive) contains an identity phrase.
pub fn is_identity_question(text: &str) -> bool {
    let lower = text.to_lowercase();
    IDENTITY_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_questions_match_case_insensitively() {
        assert!(is_identity_question("Who are you?"));
        assert!(is_identity_question("WHAT IS YOUR NAME"));
        assert!(is_identity_question("hey, may I know your name please"));
        assert!(is_identity_question("name?"));
    }

    #[test]
    fn test_regular_questions_do_not_match() {
        assert!(!is_identity_question("Summarize the report"));
        assert!(!is_identity_question("What is the capital of France?"));
        assert!(!is_identity_question("rename this file"));
    }
}
