//! Integration tests for the AI fallback against a stubbed Gemini endpoint.
//!
//! Each attempt of the ladder is matched by its token budget, so the tests
//! observe the exact sequence of requests the handler sends.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use retail_assistant::adapters::ai::{GeminiConfig, GeminiProvider};
use retail_assistant::adapters::storage::{
    InMemoryConversationRepository, InMemoryProductRepository,
};
use retail_assistant::application::{
    FallbackSettings, ProcessMessageCommand, ProcessMessageHandler,
};
use retail_assistant::config::AiConfig;
use retail_assistant::domain::conversation::{replies, ChatTopic};
use retail_assistant::domain::foundation::UserId;
use retail_assistant::ports::ConversationRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

const GENERATE_PATH: &str = "/v1/models/gemini-1.5-flash:generateContent";

fn gemini_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
    }))
}

fn budget(max_tokens: u32) -> impl wiremock::Match {
    body_partial_json(json!({"generationConfig": {"maxOutputTokens": max_tokens}}))
}

async fn handler_for(
    server: &MockServer,
) -> (ProcessMessageHandler, InMemoryConversationRepository, ChatTopic) {
    let conversations = InMemoryConversationRepository::new();
    let user = UserId::new("kasir-01").unwrap();
    let topic = ChatTopic::new(user);
    conversations.create_topic(&topic).await.unwrap();

    let provider = GeminiProvider::new(
        GeminiConfig::new("test-key")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let handler = ProcessMessageHandler::new(
        Arc::new(conversations.clone()),
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(provider),
    )
    .with_fallback_settings(FallbackSettings::from_config(&AiConfig::default()));

    (handler, conversations, topic)
}

// =============================================================================
// Ladder
// =============================================================================

#[tokio::test]
async fn third_attempt_answers_after_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(budget(1024))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(budget(2048))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(budget(256))
        .and(body_partial_json(json!({"generationConfig": {"temperature": 0.0}})))
        .respond_with(gemini_text("  Toko buka jam 8 pagi.  "))
        .expect(1)
        .mount(&server)
        .await;

    let (handler, conversations, topic) = handler_for(&server).await;

    let result = handler
        .handle(ProcessMessageCommand::new(
            topic.owner().clone(),
            *topic.id(),
            "jam berapa toko buka?",
        ))
        .await
        .unwrap();

    assert_eq!(result.reply, "Toko buka jam 8 pagi.");
    assert_eq!(conversations.messages_for(topic.id()).await.len(), 2);
}

#[tokio::test]
async fn exhausted_ladder_replies_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let (handler, conversations, topic) = handler_for(&server).await;

    let result = handler
        .handle(ProcessMessageCommand::new(
            topic.owner().clone(),
            *topic.id(),
            "halo",
        ))
        .await
        .unwrap();

    assert_eq!(result.reply, replies::AI_UNAVAILABLE);
    let stored = conversations.messages_for(topic.id()).await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].content(), replies::AI_UNAVAILABLE);
}

#[tokio::test]
async fn prompt_carries_prior_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "USER: halo\n\nASSISTANT: Halo juga!\n\nUSER: apa kabar?"}]}]
        })))
        .respond_with(gemini_text("Baik."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(gemini_text("Halo juga!"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let (handler, _, topic) = handler_for(&server).await;
    let first = handler
        .handle(ProcessMessageCommand::new(topic.owner().clone(), *topic.id(), "halo"))
        .await
        .unwrap();
    let second = handler
        .handle(ProcessMessageCommand::new(
            topic.owner().clone(),
            *topic.id(),
            "apa kabar?",
        ))
        .await
        .unwrap();

    assert_eq!(first.reply, "Halo juga!");
    assert_eq!(second.reply, "Baik.");
}
