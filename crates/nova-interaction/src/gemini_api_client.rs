//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! Sends the role-tagged conversation history to `generateContent` and
//! parses the reply. The API key is supplied at runtime (see
//! `nova_core::secret::SecretService`) and travels as the `key` query
//! parameter.

use async_trait::async_trait;
use nova_core::completion::{CompletionClient, CompletionError, CompletionReply, CompletionTurn};
use nova_core::config::{CompletionSettings, DEFAULT_GEMINI_BASE_URL};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const RESPONSE_MIME_TYPE: &str = "text/plain";

/// Completion client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    /// Creates a client from `[completion]` settings.
    pub fn from_settings(settings: &CompletionSettings, api_key: impl Into<String>) -> Self {
        Self::new(api_key, settings.model.clone()).with_base_url(settings.base_url.clone())
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at a different `models` collection URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(history: &[CompletionTurn]) -> Result<GenerateContentRequest, CompletionError> {
        if history.is_empty() {
            return Err(CompletionError::InvalidRequest(
                "Gemini payload must include at least one turn".into(),
            ));
        }

        let contents = history
            .iter()
            .map(|turn| Content {
                role: turn.role.as_str().to_string(),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        Ok(GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            },
        })
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<CompletionReply, CompletionError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            // The URL carries the key, keep it out of error messages.
            .map_err(|err| CompletionError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|err| CompletionError::Transport(err.without_url().to_string()))?;

        match serde_json::from_str::<GenerateContentResponse>(&body_text) {
            Ok(parsed) => {
                if !status.is_success() {
                    tracing::warn!(status = status.as_u16(), "Gemini API returned an error status");
                }
                Ok(extract_reply(parsed))
            }
            Err(_) if !status.is_success() => Err(CompletionError::Status {
                status: status.as_u16(),
                body: body_text,
            }),
            Err(err) => Err(CompletionError::MalformedBody(err.to_string())),
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiApiClient {
    async fn complete(
        &self,
        history: &[CompletionTurn],
    ) -> Result<CompletionReply, CompletionError> {
        let request = Self::build_request(history)?;
        tracing::debug!(model = %self.model, turns = history.len(), "Sending Gemini request");
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Reply text of the first candidate, else the error message, else nothing.
fn extract_reply(response: GenerateContentResponse) -> CompletionReply {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.is_empty());

    if let Some(text) = text {
        return CompletionReply::Text(text);
    }

    match response.error.and_then(|e| e.message).filter(|m| !m.is_empty()) {
        Some(message) => CompletionReply::ApiError(message),
        None => CompletionReply::Empty,
    }
}
