//! Spense Web Server
//!
//! Axum-based REST API for the Spense expense tracker.
//!
//! Authentication/session issuance is an external collaborator: requests
//! arrive with the owner identity already resolved into the `X-User-Id`
//! header (set by a fronting proxy or gateway). Every store access is
//! scoped to that owner. Error responses are sanitized; internal detail
//! goes to the log only.

use std::sync::{Arc, RwLock};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use spense_core::ai::{Provider, ProviderChain};
use spense_core::prompts::PromptLibrary;
use spense_core::{Assistant, Classifier, MemoryStore};

mod handlers;

#[cfg(test)]
mod tests;

/// Header carrying the resolved owner identity.
const OWNER_ID_HEADER: &str = "x-user-id";

/// Owner used when authentication is disabled for local development.
const LOCAL_DEV_OWNER: &str = "local-dev";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether an owner identity header is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: MemoryStore,
    pub config: ServerConfig,
    pub classifier: Classifier,
    pub assistant: Assistant,
    /// Kept for the provider health endpoint
    pub chain: ProviderChain,
}

/// Extract the owner identity from request headers.
///
/// Falls back to a fixed local-dev owner; the auth middleware guarantees
/// the header is present whenever `require_auth` is set.
pub fn get_owner_id(headers: &HeaderMap) -> String {
    headers
        .get(OWNER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| LOCAL_DEV_OWNER.to_string())
}

/// Authentication middleware: requires a non-empty owner identity header
/// unless authentication is disabled.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let has_owner = request
        .headers()
        .get(OWNER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);

    if has_owner {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - missing owner identity");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router, wiring providers from the environment.
pub fn create_router(config: ServerConfig) -> Router {
    let chain = ProviderChain::from_env();
    if chain.is_empty() {
        info!("No AI providers configured (set OLLAMA_HOST or OPENAI_COMPATIBLE_HOST); new expenses get the default category");
    } else {
        for provider in chain.providers() {
            info!(
                "AI provider configured: {} (model: {})",
                provider.host(),
                provider.model()
            );
        }
    }
    create_router_with_chain(config, chain)
}

/// Create the application router with an explicit provider chain
/// (used by tests to inject mock providers).
pub fn create_router_with_chain(config: ServerConfig, chain: ProviderChain) -> Router {
    let prompts = Arc::new(RwLock::new(PromptLibrary::new()));
    let state = Arc::new(AppState {
        store: MemoryStore::new(),
        config: config.clone(),
        classifier: Classifier::with_prompts(chain.clone(), prompts.clone()),
        assistant: Assistant::with_prompts(chain.clone(), prompts),
        chain,
    });

    let api_routes = Router::new()
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/monthly-summary",
            get(handlers::get_monthly_summary),
        )
        .route(
            "/expenses/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        // AI assistant
        .route("/ai/insights", get(handlers::get_insights))
        .route("/ai/chat", post(handlers::chat))
        .route("/ai/health", get(handlers::ai_health));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("Authentication disabled - do not expose to network!");
    }

    check_ai_connection().await;

    let app = create_router(config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log provider connection status at startup
async fn check_ai_connection() {
    let chain = ProviderChain::from_env();
    if chain.is_empty() {
        info!("No AI providers configured (set OLLAMA_HOST or OPENAI_COMPATIBLE_HOST)");
        return;
    }
    for provider in chain.providers() {
        if provider.health_check().await {
            info!(
                "AI provider connected: {} (model: {})",
                provider.host(),
                provider.model()
            );
        } else {
            warn!(
                "AI provider configured but not responding: {} (model: {})",
                provider.host(),
                provider.model()
            );
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<String>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(ref err) = self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<spense_core::Error> for AppError {
    fn from(err: spense_core::Error) -> Self {
        use spense_core::Error;
        match err {
            Error::InvalidRequest(msg) => Self {
                status: StatusCode::BAD_REQUEST,
                message: msg,
                internal: None,
            },
            Error::NotFound(what) => Self {
                status: StatusCode::NOT_FOUND,
                message: format!("{} not found", what),
                internal: None,
            },
            // No safe default answer exists for insight/chat requests
            Error::AllProvidersExhausted => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "AI assistant unavailable".to_string(),
                internal: Some("every configured AI provider failed".to_string()),
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                internal: Some(other.to_string()),
            },
        }
    }
}
