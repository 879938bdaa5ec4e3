//! Insight and chat-answer generation
//!
//! Unlike classification, the output here is open-ended text with no
//! validation surface, so the provider's (trimmed) answer passes through
//! verbatim. Provider exhaustion surfaces to the caller; there is no safe
//! default insight.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ai::ProviderChain;
use crate::error::{Error, Result};
use crate::models::Expense;
use crate::prompts::{render_expense_lines, sanitize_fragment, PromptId, PromptLibrary};

/// Fixed reply when there is no history to analyze. Returned without
/// touching any provider.
pub const NO_DATA_MESSAGE: &str = "No expenses found yet.";

/// Generates free-text insights and chat answers from an expense history.
#[derive(Clone)]
pub struct Assistant {
    chain: ProviderChain,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Assistant {
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create with a shared prompt library.
    pub fn with_prompts(chain: ProviderChain, prompts: Arc<RwLock<PromptLibrary>>) -> Self {
        Self { chain, prompts }
    }

    /// Three short statements about the history: trend, savings tip, top
    /// spending category.
    pub async fn insights(&self, expenses: &[Expense]) -> Result<String> {
        if expenses.is_empty() {
            return Ok(NO_DATA_MESSAGE.to_string());
        }

        let prompt = self.render(
            PromptId::SpendingInsights,
            &render_expense_lines(expenses),
            None,
        )?;
        let reply = self.chain.resolve(&prompt).await?;
        Ok(reply.trim().to_string())
    }

    /// Answer a free-text question about the history.
    ///
    /// The question must be non-empty; the expense list may be empty (the
    /// prompt tells the model to say so).
    pub async fn answer(&self, expenses: &[Expense], question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidRequest("Please provide a question".into()));
        }

        let lines = if expenses.is_empty() {
            NO_DATA_MESSAGE.to_string()
        } else {
            render_expense_lines(expenses)
        };

        let prompt = self.render(PromptId::ChatAnswer, &lines, Some(question))?;
        let reply = self.chain.resolve(&prompt).await?;
        Ok(reply.trim().to_string())
    }

    fn render(&self, id: PromptId, lines: &str, question: Option<&str>) -> Result<String> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(id)?;

        let sanitized_question = question.map(sanitize_fragment);
        let mut vars = HashMap::new();
        vars.insert("expenses", lines);
        if let Some(ref q) = sanitized_question {
            vars.insert("question", q.as_str());
        }
        Ok(template.render_user(&vars))
    }
}
