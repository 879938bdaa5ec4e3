//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use spense_core::{MockProvider, MockReply, ProviderClient};
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
    }
}

fn app_with_provider(provider: MockProvider) -> Router {
    let chain = ProviderChain::new(vec![ProviderClient::Mock(provider)]);
    create_router_with_chain(test_config(), chain)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create(app: &Router, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    get_body_json(response).await
}

// ========== Auth Tests ==========

#[tokio::test]
async fn test_missing_identity_rejected_when_auth_required() {
    let config = ServerConfig {
        require_auth: true,
        allowed_origins: vec![],
    };
    let chain = ProviderChain::new(vec![]);
    let app = create_router_with_chain(config, chain);

    let response = app
        .oneshot(get_request("/api/expenses"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_identity_header_accepted_when_auth_required() {
    let config = ServerConfig {
        require_auth: true,
        allowed_origins: vec![],
    };
    let chain = ProviderChain::new(vec![]);
    let app = create_router_with_chain(config, chain);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/expenses")
                .header("x-user-id", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ========== Expense CRUD Tests ==========

#[tokio::test]
async fn test_create_expense_uses_ai_category() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let json = create(
        &app,
        serde_json::json!({
            "title": "Pizza night",
            "amount": 24.50,
            "date": "2025-04-02"
        }),
    )
    .await;

    assert_eq!(json["title"], "Pizza night");
    assert_eq!(json["amount"], 24.50);
    assert_eq!(json["category"], "Food");
    assert_eq!(json["suggested_category"], "Food");
    assert_eq!(json["date"], "2025-04-02");
}

#[tokio::test]
async fn test_create_expense_unrecognized_label_falls_back() {
    let app = app_with_provider(MockProvider::replying("Groceries maybe?"));

    let json = create(
        &app,
        serde_json::json!({ "title": "Weekly shop", "amount": 80.0 }),
    )
    .await;

    assert_eq!(json["category"], "Other");
}

#[tokio::test]
async fn test_create_expense_succeeds_when_providers_down() {
    let app = app_with_provider(MockProvider::unavailable());

    let json = create(
        &app,
        serde_json::json!({ "title": "Bus ticket", "amount": 3.20 }),
    )
    .await;

    assert_eq!(json["category"], "Other");
}

#[tokio::test]
async fn test_create_expense_blank_title_rejected() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({ "title": "   ", "amount": 10.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_expense_nonpositive_amount_rejected() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({ "title": "Refund", "amount": 0.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_expenses_scoped_to_owner() {
    let config = ServerConfig {
        require_auth: true,
        allowed_origins: vec![],
    };
    let chain = ProviderChain::new(vec![ProviderClient::Mock(MockProvider::replying("Food"))]);
    let app = create_router_with_chain(config, chain);

    let mut request = json_request(
        "POST",
        "/api/expenses",
        serde_json::json!({ "title": "Lunch", "amount": 12.0 }),
    );
    request
        .headers_mut()
        .insert("x-user-id", "alice".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/expenses")
                .header("x-user-id", "bob")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_expense() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let created = create(
        &app,
        serde_json::json!({ "title": "Dinner", "amount": 30.0 }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/expenses/{id}"),
            serde_json::json!({ "category": "Entertainment", "amount": 35.5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Entertainment");
    assert_eq!(json["amount"], 35.5);
    // Untouched fields survive a partial update
    assert_eq!(json["title"], "Dinner");
    assert_eq!(json["suggested_category"], "Food");
}

#[tokio::test]
async fn test_update_description_null_clears_absent_keeps() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let created = create(
        &app,
        serde_json::json!({
            "title": "Dinner",
            "amount": 30.0,
            "description": "with friends"
        }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["description"], "with friends");

    // Absent field keeps the stored description
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/expenses/{id}"),
            serde_json::json!({ "title": "Dinner out" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], "with friends");

    // Explicit null clears it
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/expenses/{id}"),
            serde_json::json!({ "description": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_missing_expense_returns_404() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/expenses/999",
            serde_json::json!({ "title": "Ghost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_expense() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let created = create(
        &app,
        serde_json::json!({ "title": "Coffee", "amount": 4.0 }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);

    let response = app.oneshot(get_request("/api/expenses")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_missing_expense_returns_404() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/expenses/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Monthly Summary Tests ==========

#[tokio::test]
async fn test_monthly_summary_buckets_and_labels() {
    let app = app_with_provider(MockProvider::replying("Food"));

    create(
        &app,
        serde_json::json!({ "title": "Rent", "amount": 200.0, "date": "2025-01-03" }),
    )
    .await;
    create(
        &app,
        serde_json::json!({ "title": "Power", "amount": 150.0, "date": "2025-01-20" }),
    )
    .await;
    create(
        &app,
        serde_json::json!({ "title": "Cinema", "amount": 75.0, "date": "2025-02-11" }),
    )
    .await;

    let response = app
        .oneshot(get_request("/api/expenses/monthly-summary"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["month"], "Jan 2025");
    assert_eq!(rows[0]["total"], 350.0);
    assert_eq!(rows[1]["month"], "Feb 2025");
    assert_eq!(rows[1]["total"], 75.0);
}

// ========== AI Endpoint Tests ==========

#[tokio::test]
async fn test_insights_without_expenses_skips_providers() {
    let provider = MockProvider::replying("should not be called");
    let calls = provider.clone();
    let app = app_with_provider(provider);

    let response = app.oneshot(get_request("/api/ai/insights")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["insights"], spense_core::NO_DATA_MESSAGE);
    assert_eq!(calls.calls(), 0);
}

#[tokio::test]
async fn test_insights_with_expenses() {
    let chain = ProviderChain::new(vec![ProviderClient::Mock(
        MockProvider::replying("Food")
            .with_reply(MockReply::Text("You spend a lot on pizza.".into())),
    )]);
    let app = create_router_with_chain(test_config(), chain);

    create(
        &app,
        serde_json::json!({ "title": "Pizza", "amount": 20.0 }),
    )
    .await;

    let response = app.oneshot(get_request("/api/ai/insights")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["insights"], "You spend a lot on pizza.");
}

#[tokio::test]
async fn test_chat_blank_question_rejected_before_providers() {
    let provider = MockProvider::replying("should not be called");
    let calls = provider.clone();
    let app = app_with_provider(provider);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ai/chat",
            serde_json::json!({ "question": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.calls(), 0);
}

#[tokio::test]
async fn test_chat_unavailable_providers_return_503() {
    let app = app_with_provider(MockProvider::unavailable());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ai/chat",
            serde_json::json!({ "question": "Where does my money go?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "AI assistant unavailable");
}

#[tokio::test]
async fn test_chat_answers_question() {
    let app = app_with_provider(MockProvider::replying(
        "You spent 20.00 on food this month.",
    ));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ai/chat",
            serde_json::json!({ "question": "How much on food?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["reply"], "You spent 20.00 on food this month.");
}

#[tokio::test]
async fn test_ai_health_reports_providers() {
    let app = app_with_provider(MockProvider::replying("Food"));

    let response = app.oneshot(get_request("/api/ai/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["configured"], true);
    let providers = json["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["healthy"], true);
}

#[tokio::test]
async fn test_ai_health_with_no_providers() {
    let app = create_router_with_chain(test_config(), ProviderChain::new(vec![]));

    let response = app.oneshot(get_request("/api/ai/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["configured"], false);
}
