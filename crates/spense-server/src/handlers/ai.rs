//! AI insight, chat, and provider health handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use spense_core::store::ExpenseStore;
use spense_core::Provider;

use crate::{get_owner_id, AppError, AppState};

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub host: String,
    pub model: String,
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct AiHealthResponse {
    pub configured: bool,
    pub providers: Vec<ProviderStatus>,
}

/// GET /api/ai/insights - spending observations from the owner's history
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<InsightsResponse>, AppError> {
    let owner = get_owner_id(&headers);
    let expenses = state.store.find_by_owner(&owner)?;
    let insights = state.assistant.insights(&expenses).await?;
    Ok(Json(InsightsResponse { insights }))
}

/// POST /api/ai/chat - answer a free-form question about the owner's spending
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let owner = get_owner_id(&headers);
    let expenses = state.store.find_by_owner(&owner)?;
    let reply = state.assistant.answer(&expenses, &body.question).await?;
    Ok(Json(ChatResponse { reply }))
}

/// GET /api/ai/health - reachability of each configured provider
pub async fn ai_health(State(state): State<Arc<AppState>>) -> Json<AiHealthResponse> {
    let mut providers = Vec::new();
    for provider in state.chain.providers() {
        providers.push(ProviderStatus {
            host: provider.host().to_string(),
            model: provider.model().to_string(),
            healthy: provider.health_check().await,
        });
    }
    Json(AiHealthResponse {
        configured: !state.chain.is_empty(),
        providers,
    })
}
