use nova_core::completion::{
    CompletionClient, CompletionError, CompletionReply, CompletionTurn, TurnRole,
};
use nova_interaction::GeminiApiClient;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash";

fn client_for(server: &MockServer) -> GeminiApiClient {
    GeminiApiClient::new("test-key", MODEL).with_base_url(format!("{}/v1beta/models", server.uri()))
}

fn history() -> Vec<CompletionTurn> {
    vec![
        CompletionTurn {
            role: TurnRole::User,
            text: "Hello".to_string(),
        },
        CompletionTurn {
            role: TurnRole::Model,
            text: "Hi! How can I help?".to_string(),
        },
        CompletionTurn {
            role: TurnRole::User,
            text: "Summarize\n\n[Attached Document Content]:\nRevenue grew 10%".to_string(),
        },
    ]
}

#[tokio::test]
async fn sends_history_with_key_and_parses_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "Hello" }] },
                { "role": "model", "parts": [{ "text": "Hi! How can I help?" }] },
                { "role": "user", "parts": [{ "text": "Summarize\n\n[Attached Document Content]:\nRevenue grew 10%" }] }
            ],
            "generationConfig": { "responseMimeType": "text/plain" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Revenue rose by a tenth." }] } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete(&history()).await.unwrap();

    assert_eq!(reply, CompletionReply::Text("Revenue rose by a tenth.".to_string()));
}

#[tokio::test]
async fn error_status_with_json_body_yields_api_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server).complete(&history()).await.unwrap();

    assert_eq!(reply, CompletionReply::ApiError("API key not valid.".to_string()));
}

#[tokio::test]
async fn error_status_without_json_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    match err {
        CompletionError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn success_with_garbage_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&history()).await.unwrap_err();

    assert!(matches!(err, CompletionError::MalformedBody(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_failure_without_key() {
    let client = GeminiApiClient::new("super-secret", MODEL).with_base_url("http://127.0.0.1:9/models");

    let err = client.complete(&history()).await.unwrap_err();

    assert!(matches!(err, CompletionError::Transport(_)));
    assert!(!err.to_string().contains("super-secret"));
}
