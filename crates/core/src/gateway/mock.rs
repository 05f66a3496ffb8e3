//! Scripted backend for tests and offline runs.

use super::base::{CompletionBackend, CompletionRequest, ImageRequest};
use super::error::GatewayError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A backend that replays scripted replies and records what it was sent.
///
/// Once the script runs out, text completions echo their input as
/// `"output of <model>: <input>"` and transcriptions return `"page text"`.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies returned in order by subsequent calls.
    pub fn with_replies(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Sleep before answering, to keep a call in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: Result<String, GatewayError>) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    /// Number of calls received, text and image combined.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Text completion requests received, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn next_reply(&self) -> Option<Result<String, GatewayError>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, _api_key: &str, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        self.pause().await;

        self.next_reply()
            .unwrap_or_else(|| Ok(format!("output of {}: {}", request.model, request.user_input)))
    }

    async fn transcribe_image(&self, _api_key: &str, _request: &ImageRequest) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        self.next_reply().unwrap_or_else(|| Ok("page text".to_string()))
    }
}
