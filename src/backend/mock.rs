//! Mock backend for testing without a live model.
//!
//! [`MockBackend`] returns pre-configured replies in order and records every
//! prompt it receives, so tests can assert both on results and on how many
//! round-trips a pipeline made.
//!
//! # Example
//!
//! ```
//! use niche_analyst::backend::MockBackend;
//!
//! let mock = MockBackend::fixed("```json\n{}\n```");
//! assert_eq!(mock.calls(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, LlmRequest, LlmResponse};
use crate::error::Result;
use crate::AnalysisError;

/// One scripted reply of a [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Answer with this text.
    Text(String),
    /// Fail with [`AnalysisError::BackendUnavailable`] carrying this message.
    Unavailable(String),
}

impl From<&str> for MockReply {
    fn from(text: &str) -> Self {
        MockReply::Text(text.to_string())
    }
}

impl From<String> for MockReply {
    fn from(text: String) -> Self {
        MockReply::Text(text)
    }
}

/// A test backend that returns canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a mock backend with the given canned text replies.
    pub fn new(responses: Vec<String>) -> Self {
        Self::script(responses.into_iter().map(MockReply::Text).collect())
    }

    /// Create a mock backend from scripted replies, including failures.
    pub fn script(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "MockBackend requires at least one reply");
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Create a mock that always fails as unavailable.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::script(vec![MockReply::Unavailable(message.into())])
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn next_reply(&self) -> MockReply {
        let idx = self.index.fetch_add(1, Ordering::SeqCst) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.prompt.clone());

        match self.next_reply() {
            MockReply::Text(text) => Ok(LlmResponse {
                text,
                status: 200,
                metadata: None,
            }),
            MockReply::Unavailable(message) => Err(AnalysisError::backend(self.name(), message)),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> LlmRequest {
        LlmRequest {
            model: "test".to_string(),
            prompt: prompt.to_string(),
            config: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let mock = MockBackend::fixed("Hello!");
        let resp = mock
            .complete(&Client::new(), "http://unused", &request("p"))
            .await
            .unwrap();
        assert_eq!(resp.text, "Hello!");
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn test_mock_cycles_and_records() {
        let mock = MockBackend::new(vec!["first".into(), "second".into()]);
        let client = Client::new();
        let r1 = mock.complete(&client, "http://unused", &request("a")).await.unwrap();
        let r2 = mock.complete(&client, "http://unused", &request("b")).await.unwrap();
        let r3 = mock.complete(&client, "http://unused", &request("c")).await.unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
        assert_eq!(r3.text, "first"); // cycles
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let mock = MockBackend::script(vec![MockReply::Unavailable("down".into()), "ok".into()]);
        let client = Client::new();
        let err = mock.complete(&client, "x", &request("a")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::BackendUnavailable { .. }));
        let ok = mock.complete(&client, "x", &request("b")).await.unwrap();
        assert_eq!(ok.text, "ok");
    }
}
