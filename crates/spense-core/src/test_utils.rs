//! Test utilities for spense-core
//!
//! Provides mock Ollama-shaped and OpenAI-shaped HTTP servers for
//! exercising the real provider transports in integration tests.

use axum::extract::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// What the mock server should do with generate requests.
#[derive(Clone)]
enum Behavior {
    /// Reply with this fixed text
    Reply(String),
    /// Return 200 with a payload missing the text field
    Broken,
    /// Return 500
    Fail,
}

/// Mock Ollama server for testing
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start a server whose generate endpoint always replies with `text`
    pub async fn start_replying(text: &str) -> Self {
        Self::start(Behavior::Reply(text.to_string())).await
    }

    /// Start a server whose generate endpoint returns an unusable payload
    pub async fn start_broken() -> Self {
        Self::start(Behavior::Broken).await
    }

    /// Start a server whose generate endpoint returns 500
    pub async fn start_failing() -> Self {
        Self::start(Behavior::Fail).await
    }

    async fn start(behavior: Behavior) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route(
                "/api/generate",
                post(move |req| handle_generate(behavior.clone(), req)),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
}

async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "mistral:latest".to_string(),
        }],
    })
}

#[derive(Deserialize)]
struct GenerateRequest {
    model: String,
    #[allow(dead_code)]
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

async fn handle_generate(
    behavior: Behavior,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match behavior {
        Behavior::Reply(text) => Ok(Json(
            serde_json::to_value(GenerateResponse {
                model: request.model,
                response: text,
                done: true,
            })
            .unwrap(),
        )),
        Behavior::Broken => Ok(Json(serde_json::json!({ "model": request.model }))),
        Behavior::Fail => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// What the mock OpenAI-compatible server should do with completion requests.
#[derive(Clone)]
enum ChatBehavior {
    /// Reply with this fixed text
    Reply(String),
    /// Return 200 with an empty choices array
    EmptyChoices,
    /// Return 500
    Fail,
}

/// Mock OpenAI-compatible server for testing
pub struct MockOpenAIServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockOpenAIServer {
    /// Start a server whose completions endpoint always replies with `text`
    pub async fn start_replying(text: &str) -> Self {
        Self::start(ChatBehavior::Reply(text.to_string())).await
    }

    /// Start a server whose completions endpoint returns no choices
    pub async fn start_empty_choices() -> Self {
        Self::start(ChatBehavior::EmptyChoices).await
    }

    /// Start a server whose completions endpoint returns 500
    pub async fn start_failing() -> Self {
        Self::start(ChatBehavior::Fail).await
    }

    async fn start(behavior: ChatBehavior) -> Self {
        let auth_headers: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = auth_headers.clone();

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route(
                "/v1/chat/completions",
                post(move |headers, req| {
                    handle_completions(behavior.clone(), seen.clone(), headers, req)
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            auth_headers,
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Authorization header values seen by the completions endpoint,
    /// in call order (`None` when the request carried no header)
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "object": "list",
        "data": [{ "id": "gpt-3.5-turbo", "object": "model" }]
    }))
}

#[derive(Deserialize)]
struct CompletionRequest {
    model: String,
    #[allow(dead_code)]
    messages: serde_json::Value,
}

async fn handle_completions(
    behavior: ChatBehavior,
    seen: Arc<Mutex<Vec<Option<String>>>>,
    headers: HeaderMap,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if let Ok(mut auth) = seen.lock() {
        auth.push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
        );
    }

    match behavior {
        ChatBehavior::Reply(text) => Ok(Json(serde_json::json!({
            "model": request.model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        }))),
        ChatBehavior::EmptyChoices => Ok(Json(serde_json::json!({
            "model": request.model,
            "choices": []
        }))),
        ChatBehavior::Fail => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
