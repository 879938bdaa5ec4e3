//! Pluggable text-generation provider abstraction
//!
//! # Architecture
//!
//! - `Provider` trait: one uniform capability, `generate(prompt) -> text`
//! - `ProviderClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - `ProviderChain`: ordered fallback over providers
//! - Implementations: `OllamaProvider`, `OpenAICompatibleProvider`, `MockProvider`
//!
//! Providers differ only in transport and model selection, never in
//! contract: they return generated text, fail `ProviderUnavailable` on
//! transport/timeout/non-2xx, and fail `ProviderMalformed` when the response
//! is missing the expected text field. Every call carries a bounded timeout.
//!
//! # Configuration
//!
//! Environment variables:
//! - `OLLAMA_HOST`: Ollama server URL (enables the Ollama provider)
//! - `OLLAMA_MODEL`: Model name (default: mistral)
//! - `OPENAI_COMPATIBLE_HOST`: OpenAI-style server URL (enables that provider)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)
//! - `SPENSE_AI_TIMEOUT_SECS`: Per-request timeout (default: 30)

mod chain;
mod mock;
mod ollama;
mod openai_compatible;

pub use chain::ProviderChain;
pub use mock::{MockProvider, MockReply};
pub use ollama::OllamaProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Default per-request generation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read the configured generation timeout from the environment.
pub fn timeout_from_env() -> Duration {
    std::env::var("SPENSE_AI_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT)
}

/// Uniform capability over one text-generation backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a rendered prompt and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete provider enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ProviderClient {
    /// Ollama (local HTTP API)
    Ollama(OllamaProvider),
    /// OpenAI-compatible server (vLLM, LocalAI, llama-server, hosted APIs)
    OpenAICompatible(OpenAICompatibleProvider),
    /// Mock provider for testing
    Mock(MockProvider),
}

#[async_trait]
impl Provider for ProviderClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            ProviderClient::Ollama(p) => p.generate(prompt).await,
            ProviderClient::OpenAICompatible(p) => p.generate(prompt).await,
            ProviderClient::Mock(p) => p.generate(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ProviderClient::Ollama(p) => p.health_check().await,
            ProviderClient::OpenAICompatible(p) => p.health_check().await,
            ProviderClient::Mock(p) => p.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ProviderClient::Ollama(p) => p.model(),
            ProviderClient::OpenAICompatible(p) => p.model(),
            ProviderClient::Mock(p) => p.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ProviderClient::Ollama(p) => p.host(),
            ProviderClient::OpenAICompatible(p) => p.host(),
            ProviderClient::Mock(p) => p.host(),
        }
    }
}
