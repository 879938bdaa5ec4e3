//! Ordered provider fallback
//!
//! One logical generation request walks the configured providers in
//! preference order, moving on when a provider is unavailable or returns an
//! unusable payload. The chain is stateless across calls: no sticky routing,
//! no retry within a single provider.

use tracing::warn;

use crate::error::{Error, Result};

use super::{OllamaProvider, OpenAICompatibleProvider, Provider, ProviderClient};

/// Ordered fallback sequence of providers for one logical request.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<ProviderClient>,
}

impl ProviderChain {
    /// Build a chain from an explicit provider order.
    pub fn new(providers: Vec<ProviderClient>) -> Self {
        Self { providers }
    }

    /// Build the chain from environment variables, in preference order:
    /// Ollama first, then any OpenAI-compatible endpoint. Either may be
    /// absent; an empty chain is valid (everything falls back).
    pub fn from_env() -> Self {
        let mut providers = Vec::new();
        if let Some(p) = OllamaProvider::from_env() {
            providers.push(ProviderClient::Ollama(p));
        }
        if let Some(p) = OpenAICompatibleProvider::from_env() {
            providers.push(ProviderClient::OpenAICompatible(p));
        }
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Configured providers, in order.
    pub fn providers(&self) -> &[ProviderClient] {
        &self.providers
    }

    /// Resolve one prompt through the chain.
    ///
    /// Providers are tried sequentially; `ProviderUnavailable` and
    /// `ProviderMalformed` from one provider are logged and the next is
    /// tried. Total latency is bounded by the sum of per-provider timeouts.
    pub async fn resolve(&self, prompt: &str) -> Result<String> {
        for provider in &self.providers {
            match provider.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e @ Error::ProviderUnavailable(_)) | Err(e @ Error::ProviderMalformed(_)) => {
                    warn!(
                        host = %provider.host(),
                        model = %provider.model(),
                        error = %e,
                        "Provider failed; trying next"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::AllProvidersExhausted)
    }
}
