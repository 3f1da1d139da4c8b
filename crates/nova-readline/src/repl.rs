use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use nova_application::conversation::UPLOAD_NOTICE_PREFIX;
use nova_application::{ConversationController, SpeechCaptureAdapter, SubmitOutcome, UploadOutcome};
use nova_core::session::Message;
use nova_core::speech::SpeechError;

use crate::helper::CliHelper;

const PROMPT: &str = ">> ";

/// Terminal front end over one conversation.
pub struct Repl {
    controller: Arc<ConversationController>,
    speech: Arc<SpeechCaptureAdapter>,
    transcript_tx: mpsc::UnboundedSender<Result<String, SpeechError>>,
    transcript_rx: mpsc::UnboundedReceiver<Result<String, SpeechError>>,
    /// Text placed in the next prompt's input buffer.
    staged: String,
}

impl Repl {
    pub fn new(controller: Arc<ConversationController>, speech: Arc<SpeechCaptureAdapter>) -> Self {
        let (transcript_tx, transcript_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            speech,
            transcript_tx,
            transcript_rx,
            staged: String::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper::new()));

        println!("{}", "=== NoVa ===".bright_magenta().bold());
        println!(
            "{}",
            "Type a message, '/help' for commands, or 'quit' to exit.".bright_black()
        );
        println!();

        for message in self.controller.messages().await {
            print_message(&message);
        }

        loop {
            self.collect_transcripts();
            let initial = std::mem::take(&mut self.staged);

            match rl.readline_with_initial(PROMPT, (&initial, "")) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed == "quit" || trimmed == "exit" {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }

                    if trimmed.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(&line);

                    if trimmed.starts_with('/') {
                        self.handle_command(trimmed).await;
                    } else {
                        self.submit(trimmed).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "CTRL-D detected. Exiting...".bright_green());
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }

        self.speech.stop();
        Ok(())
    }

    async fn handle_command(&mut self, line: &str) {
        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match command {
            "/upload" => self.upload(argument).await,
            "/mic" => self.toggle_microphone(),
            "/clear" => {
                self.controller.reset_session().await;
                println!("{}", "Conversation cleared.".bright_green());
            }
            "/history" => {
                let messages = self.controller.messages().await;
                if messages.is_empty() {
                    println!("{}", "No messages yet.".bright_black());
                }
                for message in messages {
                    print_message(&message);
                }
            }
            "/help" => print_help(),
            other => {
                println!("{}", format!("Unknown command: {other}").bright_black());
            }
        }
    }

    async fn submit(&mut self, text: &str) {
        println!("{}", "NoVa is typing...".bright_black().italic());

        match self.controller.submit_user_text(text).await {
            SubmitOutcome::Replied { reply, .. } => print_message(&reply),
            SubmitOutcome::Busy => {
                println!("{}", "Still waiting for the previous reply.".yellow());
            }
            SubmitOutcome::Ignored | SubmitOutcome::Discarded { .. } => {}
        }
    }

    async fn upload(&mut self, argument: &str) {
        if argument.is_empty() {
            println!("{}", "Usage: /upload <path>".yellow());
            return;
        }

        let path = Path::new(argument);
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(argument)
            .to_string();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("{}", format!("Cannot open {}: {}", path.display(), e).red());
                return;
            }
        };

        println!("{}", format!("Reading {file_name}...").bright_black());
        match self.controller.upload_document(&file_name, &bytes).await {
            UploadOutcome::Staged { notice, characters } => {
                print_message(&notice);
                println!(
                    "{}",
                    format!("{characters} characters will be sent with your next message.")
                        .bright_black()
                );
            }
            UploadOutcome::Failed { notice, error } => {
                print_message(&notice);
                print_message(&error);
            }
        }
    }

    fn toggle_microphone(&mut self) {
        if !self.speech.is_available() {
            println!("{}", SpeechError::Unavailable.to_string().yellow());
            return;
        }

        if self.speech.is_listening() {
            self.speech.stop();
            println!("{}", "Stopped listening.".bright_black());
            return;
        }

        let speech = Arc::clone(&self.speech);
        let tx = self.transcript_tx.clone();
        tokio::spawn(async move {
            let result = speech.listen().await;
            let _ = tx.send(result);
        });

        println!(
            "{}",
            "🎤 Listening... '/mic' again stops. The transcript appears in your next prompt."
                .bright_yellow()
        );
    }

    /// Moves finished transcripts into the staged input buffer.
    fn collect_transcripts(&mut self) {
        while let Ok(result) = self.transcript_rx.try_recv() {
            match result {
                Ok(transcript) => {
                    self.staged =
                        ConversationController::record_transcribed_speech(&self.staged, &transcript);
                }
                Err(SpeechError::Stopped) => {}
                Err(e) => println!("{}", e.to_string().yellow()),
            }
        }
    }
}

fn print_message(message: &Message) {
    if message.is_assistant() {
        println!("{}", "NoVa:".bright_magenta().bold());
        for line in message.content.lines() {
            println!("{}", line.bright_blue());
        }
        println!();
    } else if message.content.starts_with(UPLOAD_NOTICE_PREFIX) {
        println!("{}", message.content.bright_yellow());
    } else {
        println!("{}", format!("> {}", message.content).green());
    }
}

fn print_help() {
    let entries = [
        ("/upload <path>", "attach a PDF or text file to your next message"),
        ("/mic", "start or stop voice input"),
        ("/clear", "delete the conversation"),
        ("/history", "show the conversation so far"),
        ("quit", "exit"),
    ];
    for (command, description) in entries {
        println!("  {} {}", format!("{command:<16}").bright_cyan(), description);
    }
}
