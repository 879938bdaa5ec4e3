//! Expense classification
//!
//! The validation boundary between generative text and the typed `category`
//! field: whatever the providers say, only an exact taxonomy member comes
//! out, and when nothing usable comes back the default label does.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::ai::ProviderChain;
use crate::error::{Error, Result};
use crate::prompts::{sanitize_fragment, PromptId, PromptLibrary};
use crate::taxonomy::Category;

/// The label chosen for one description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// Whether the label is the provider's own answer (`true`) or the
    /// fallback default (`false`).
    pub raw: bool,
}

/// Assigns a taxonomy label to an expense description.
#[derive(Clone)]
pub struct Classifier {
    chain: ProviderChain,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Classifier {
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create with a shared prompt library (the server shares one between
    /// the classifier and the assistant).
    pub fn with_prompts(chain: ProviderChain, prompts: Arc<RwLock<PromptLibrary>>) -> Self {
        Self { chain, prompts }
    }

    /// Classify one expense.
    ///
    /// A blank description falls back to the title as the effective input.
    /// Total over all inputs: provider failure, an out-of-taxonomy answer,
    /// and an empty chain all yield `Category::DEFAULT` with `raw = false`,
    /// so adding an expense never fails on classification.
    pub async fn classify(&self, title: &str, description: Option<&str>) -> Classification {
        let input = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(title);

        match self.try_classify(input).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(error = %e, "Classification failed; using default category");
                Classification {
                    category: Category::DEFAULT,
                    raw: false,
                }
            }
        }
    }

    async fn try_classify(&self, input: &str) -> Result<Classification> {
        let prompt = {
            let mut prompts = self
                .prompts
                .write()
                .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
            let template = prompts.get(PromptId::ClassifyExpense)?;
            let categories = Category::prompt_list();
            let description = sanitize_fragment(input);
            let mut vars = HashMap::new();
            vars.insert("categories", categories.as_str());
            vars.insert("description", description.as_str());
            template.render_user(&vars)
        };

        let answer = self.chain.resolve(&prompt).await?;
        let trimmed = answer.trim();

        Ok(match Category::from_canonical(trimmed) {
            Some(category) => Classification {
                category,
                raw: true,
            },
            None => {
                warn!(answer = %trimmed, "Provider answer not in taxonomy; using default");
                Classification {
                    category: Category::DEFAULT,
                    raw: false,
                }
            }
        })
    }
}
