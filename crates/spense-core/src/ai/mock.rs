//! Mock provider for testing
//!
//! Replies follow a configurable script, counts every call, and records the
//! prompts it was given so tests can assert on both fallback behavior and
//! prompt content.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::Provider;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text
    Text(String),
    /// Fail as if the backend were unreachable
    Unavailable,
    /// Fail as if the backend returned an unusable payload
    Malformed,
}

/// Mock provider
///
/// Pops one scripted reply per `generate` call; once the script is empty it
/// keeps returning the final configured reply.
#[derive(Clone, Default)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    last: Arc<Mutex<Option<MockReply>>>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    healthy: bool,
}

impl MockProvider {
    /// Mock that always replies with the given text
    pub fn replying(text: &str) -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
        .with_reply(MockReply::Text(text.to_string()))
    }

    /// Mock that always fails as unavailable
    pub fn unavailable() -> Self {
        Self {
            healthy: false,
            ..Default::default()
        }
        .with_reply(MockReply::Unavailable)
    }

    /// Mock that always fails with a malformed response
    pub fn malformed() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
        .with_reply(MockReply::Malformed)
    }

    /// Append a scripted reply
    pub fn with_reply(self, reply: MockReply) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply.clone());
        }
        if let Ok(mut last) = self.last.lock() {
            *last = Some(reply);
        }
        self
    }

    /// Number of `generate` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts seen so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let reply = {
            let mut script = self
                .script
                .lock()
                .map_err(|_| Error::ProviderUnavailable("mock script lock poisoned".into()))?;
            match script.pop_front() {
                Some(reply) => reply,
                None => self
                    .last
                    .lock()
                    .map_err(|_| {
                        Error::ProviderUnavailable("mock script lock poisoned".into())
                    })?
                    .clone()
                    .unwrap_or(MockReply::Unavailable),
            }
        };

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Unavailable => {
                Err(Error::ProviderUnavailable("mock provider down".into()))
            }
            MockReply::Malformed => {
                Err(Error::ProviderMalformed("mock payload unusable".into()))
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockProvider::replying("first").with_reply(MockReply::Text("second".into()));
        assert_eq!(mock.generate("a").await.unwrap(), "first");
        assert_eq!(mock.generate("b").await.unwrap(), "second");
        // script exhausted: last reply repeats
        assert_eq!(mock.generate("c").await.unwrap(), "second");
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let down = MockProvider::unavailable();
        assert!(matches!(
            down.generate("x").await.unwrap_err(),
            Error::ProviderUnavailable(_)
        ));
        assert!(!down.health_check().await);

        let garbled = MockProvider::malformed();
        assert!(matches!(
            garbled.generate("x").await.unwrap_err(),
            Error::ProviderMalformed(_)
        ));
    }
}
