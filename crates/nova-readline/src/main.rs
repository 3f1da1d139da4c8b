use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use nova_application::{ConversationController, SpeechCaptureAdapter};
use nova_core::secret::SecretService;
use nova_core::session::ConversationLogStore;
use nova_core::speech::SpeechRecognizer;
use nova_infrastructure::{
    ConfigService, FileDocumentExtractor, InMemoryLogStore, JsonFileLogStore, NovaPaths,
    SecretServiceImpl,
};
use nova_interaction::{CommandSpeechRecognizer, GeminiApiClient, UnavailableSpeechRecognizer};

mod helper;
mod logging;
mod repl;

#[derive(Parser)]
#[command(name = "nova")]
#[command(about = "NoVa - chat with Gemini about your documents", long_about = None)]
struct Cli {
    /// Directory holding config.toml, secret.json and the chat history
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Gemini model to use instead of the configured one
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Keep the conversation in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = NovaPaths::new(cli.config_dir.as_deref())?;
    let _log_guard = logging::init(&paths.logs_dir(), &cli.log_level)?;
    tracing::info!(config_dir = %paths.config_dir().display(), "NoVa starting");

    let config = ConfigService::new(paths.config_file()).load()?;

    let secret_path = paths
        .ensure_secret_file()
        .with_context(|| format!("Failed to prepare {}", paths.secret_file().display()))?;
    let secret_service = SecretServiceImpl::from_environment(secret_path);
    let api_key = secret_service.gemini_api_key().await?;
    let secret_model = secret_service
        .load_secrets()
        .await?
        .gemini
        .and_then(|gemini| gemini.model_name)
        .filter(|name| !name.trim().is_empty());

    let model = cli
        .model
        .or(secret_model)
        .unwrap_or_else(|| config.completion.model.clone());
    let completion_client =
        GeminiApiClient::from_settings(&config.completion, api_key).with_model(model);
    tracing::info!(model = completion_client.model(), "Completion client ready");

    let log_store: Arc<dyn ConversationLogStore> = if cli.ephemeral {
        Arc::new(InMemoryLogStore::new())
    } else {
        let history_file = config
            .conversation
            .history_file
            .clone()
            .unwrap_or_else(|| paths.history_file());
        Arc::new(JsonFileLogStore::new(history_file))
    };

    let recognizer: Arc<dyn SpeechRecognizer> =
        match CommandSpeechRecognizer::from_command(&config.speech.command) {
            Some(recognizer) => Arc::new(recognizer),
            None => Arc::new(UnavailableSpeechRecognizer),
        };

    let controller = Arc::new(
        ConversationController::open(
            log_store,
            Arc::new(completion_client),
            Arc::new(FileDocumentExtractor::new()),
            &config.conversation,
        )
        .await,
    );
    let speech = Arc::new(SpeechCaptureAdapter::new(recognizer));

    let result = repl::Repl::new(controller, speech).run().await;
    tracing::info!("NoVa exiting");
    result
}
