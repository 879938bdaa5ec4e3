//! Spense Core Library
//!
//! Shared functionality for the Spense expense tracker:
//! - The category taxonomy and the classification validation boundary
//! - Pluggable text-generation providers (Ollama, OpenAI-compatible) with
//!   ordered fallback
//! - Prompt library for customizable generation prompts
//! - Monthly spending rollups over integer minor units
//! - Insight and chat-answer generation
//! - Owner-scoped expense store interface with an in-memory implementation

pub mod ai;
pub mod assistant;
pub mod classify;
pub mod error;
pub mod models;
pub mod money;
pub mod prompts;
pub mod store;
pub mod summary;
pub mod taxonomy;

/// Test utilities including a mock Ollama-shaped server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    MockProvider, MockReply, OllamaProvider, OpenAICompatibleProvider, Provider, ProviderChain,
    ProviderClient,
};
pub use assistant::{Assistant, NO_DATA_MESSAGE};
pub use classify::{Classification, Classifier};
pub use error::{Error, Result};
pub use models::{Expense, ExpensePatch, NewExpense};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use store::{ExpenseStore, MemoryStore};
pub use summary::{monthly_summary, MonthlyBucket};
pub use taxonomy::Category;
