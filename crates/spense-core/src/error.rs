//! Error types for Spense

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure, timeout, or non-2xx status from one provider.
    /// Recovered locally by the provider chain.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider reached but the response was unusable (missing or
    /// unparseable text payload). Recovered like `ProviderUnavailable`.
    #[error("Provider response malformed: {0}")]
    ProviderMalformed(String),

    /// Every configured provider failed for one generation request.
    #[error("All configured providers failed")]
    AllProvidersExhausted,

    /// Caller-supplied input failed a precondition.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
