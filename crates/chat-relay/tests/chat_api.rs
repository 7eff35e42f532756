//! HTTP-level tests: the axum router in front of a mocked Groq endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chat_relay::config::{Settings, UpstreamConfig};
use chat_relay::services::conversation::{MemoryStore, PromptBuilder};
use chat_relay::services::{ChatRelay, GroqClient};
use chat_relay::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    app: Router,
    upstream: MockServer,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_timeout(5).await
    }

    async fn with_timeout(timeout_seconds: u64) -> Self {
        let upstream = MockServer::start().await;

        let mut settings = Settings::default();
        settings.upstream = UpstreamConfig {
            base_url: format!("{}/openai/v1", upstream.uri()),
            api_key: "test-key".to_string(),
            timeout_seconds,
            ..UpstreamConfig::default()
        };
        let settings = Arc::new(settings);

        let store = MemoryStore::new(settings.memory.idle_ttl());
        let provider = Arc::new(GroqClient::new(settings.upstream.clone()).unwrap());
        let relay = Arc::new(ChatRelay::new(
            store.clone(),
            provider,
            PromptBuilder::new(settings.prompts.default_system_prompt.clone()),
            settings.memory.max_turns,
        ));

        let app = build_router(AppState { relay, store, settings });
        Self { app, upstream }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn chat(&self, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/", Some(body)).await
    }

    async fn history(&self, user_name: &str) -> Vec<Value> {
        let (_, value) = self
            .send(Method::GET, &format!("/memory/{}", user_name), None)
            .await;
        value["turns"].as_array().cloned().unwrap_or_default()
    }
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

#[tokio::test]
async fn test_first_chat_returns_reply_and_stores_history() {
    let ctx = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"model": "llama-3.3-70b-versatile"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello!")))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let (status, body) = ctx.chat(json!({"user_name": "alice", "message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "hello!"}));
    assert_eq!(
        ctx.history("alice").await,
        vec![
            json!({"role": "user", "content": "hi"}),
            json!({"role": "assistant", "content": "hello!"}),
        ]
    );

    let requests = ctx.upstream.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["messages"][0]["role"], "system");
    assert!(sent["messages"][0]["content"].as_str().unwrap().contains("alice"));
    assert_eq!(sent["messages"][1], json!({"role": "user", "content": "hi"}));
}

#[tokio::test]
async fn test_upstream_failure_is_reported_in_body() {
    let ctx = TestApp::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&ctx.upstream)
        .await;

    let (status, body) = ctx.chat(json!({"user_name": "alice", "message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Groq API hatası: 500 - server error"}));
    assert!(ctx.history("alice").await.is_empty());
}

#[tokio::test]
async fn test_unparseable_completion_is_reported_in_body() {
    let ctx = TestApp::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
        .mount(&ctx.upstream)
        .await;

    let (status, body) = ctx.chat(json!({"user_name": "alice", "message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("AI yanıtı işlenemedi: "), "got {}", error);
    assert!(body.get("reply").is_none());
    assert!(ctx.history("alice").await.is_empty());
}

#[tokio::test]
async fn test_upstream_timeout_is_reported_in_body() {
    let ctx = TestApp::with_timeout(1).await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&ctx.upstream)
        .await;

    let (status, body) = ctx.chat(json!({"user_name": "alice", "message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Groq API'ye ulaşılamadı: "), "got {}", error);
    assert!(body.get("reply").is_none());
    assert!(ctx.history("alice").await.is_empty());
}

#[tokio::test]
async fn test_personality_is_sent_verbatim() {
    let ctx = TestApp::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Arr")))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let (_, body) = ctx
        .chat(json!({"user_name": "alice", "message": "hi", "personality": "You are a pirate."}))
        .await;

    assert_eq!(body, json!({"reply": "Arr"}));

    let requests = ctx.upstream.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["messages"][0]["content"], "You are a pirate.");
}

#[tokio::test]
async fn test_history_is_capped_over_http() {
    let ctx = TestApp::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(8)
        .mount(&ctx.upstream)
        .await;

    for n in 0..8 {
        let (_, body) = ctx
            .chat(json!({"user_name": "bob", "message": format!("msg {}", n)}))
            .await;
        assert_eq!(body, json!({"reply": "ok"}));
    }

    let history = ctx.history("bob").await;
    assert_eq!(history.len(), 15);
    assert_eq!(history[0]["role"], "assistant");
    assert_eq!(history[14], json!({"role": "assistant", "content": "ok"}));
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let ctx = TestApp::new().await;

    let (status, body) = ctx.chat(json!({"user_name": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "user_name ve message gerekli"}));

    let (status, _) = ctx.chat(json!({"user_name": "", "message": "hi"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx.send(Method::POST, "/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(ctx.upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_on_chat_route_not_allowed() {
    let ctx = TestApp::new().await;
    let (status, _) = ctx.send(Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_memory_reset() {
    let ctx = TestApp::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello!")))
        .mount(&ctx.upstream)
        .await;

    ctx.chat(json!({"user_name": "alice", "message": "hi"})).await;
    ctx.chat(json!({"user_name": "carol", "message": "hey"})).await;
    assert_eq!(ctx.history("alice").await.len(), 2);

    let (status, body) = ctx.send(Method::DELETE, "/memory/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["removed"], true);

    assert!(ctx.history("alice").await.is_empty());
    assert_eq!(ctx.history("carol").await.len(), 2);

    let (_, body) = ctx.send(Method::DELETE, "/memory/alice", None).await;
    assert_eq!(body["removed"], false);
}

#[tokio::test]
async fn test_health_reports_active_users() {
    let ctx = TestApp::new().await;

    let (status, body) = ctx.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_users"], 0);

    let (status, _) = ctx.send(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}
