//! Deterministic mock provider.
//!
//! Never touches the network. Used by tests and by `backend = "mock"` for
//! offline runs; production wiring only builds it when configured to.

use async_trait::async_trait;
use persona_core::error::ProviderError;
use persona_core::provider::{GenerationRequest, GenerationResult, Provider};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

enum Reply {
    /// Echo both prompt parts back in a fixed format.
    Echo,
    /// Always answer with this text (may be empty).
    Fixed(String),
    /// Always fail with this error.
    Fail(ProviderError),
}

pub struct MockProvider {
    reply: Reply,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockProvider {
    /// A mock that answers `[Mocked Response] System: .. | User: ..`.
    pub fn new() -> Self {
        Self::with(Reply::Echo)
    }

    /// A mock that always answers `text`.
    pub fn with_reply(text: impl Into<String>) -> Self {
        Self::with(Reply::Fixed(text.into()))
    }

    /// A mock that always fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with(Reply::Fail(error))
    }

    fn with(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// How many times `complete` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request seen, if any.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        match &self.reply {
            Reply::Echo => Ok(GenerationResult::new(format!(
                "[Mocked Response] System: {} | User: {}",
                request.system_instruction(),
                request.user_content()
            ))),
            Reply::Fixed(text) => Ok(GenerationResult::new(text.clone())),
            Reply::Fail(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_reply_is_deterministic() {
        let mock = MockProvider::new();
        let req = GenerationRequest::new("sys", "usr").unwrap();
        let first = mock.complete(&req, &CancellationToken::new()).await.unwrap();
        let second = mock.complete(&req, &CancellationToken::new()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text, "[Mocked Response] System: sys | User: usr");
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.last_request(), Some(req));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let mock = MockProvider::with_reply("never");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let req = GenerationRequest::new("sys", "usr").unwrap();
        assert_eq!(mock.complete(&req, &cancel).await, Err(ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn failing_mock_returns_error() {
        let mock = MockProvider::failing(ProviderError::Network("down".into()));
        let req = GenerationRequest::new("sys", "usr").unwrap();
        let err = mock.complete(&req, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, ProviderError::Network("down".into()));
    }
}
