//! Scripted client for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{GenAiClient, GenAiError, GenerateRequest};

/// Replies with queued responses in order and records every request.
/// An exhausted queue answers with `EmptyResponse`.
#[derive(Debug, Default)]
pub struct MockGenAi {
    responses: Mutex<VecDeque<Result<String, GenAiError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicU32,
}

impl MockGenAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for response in responses {
            mock.push(response);
        }
        mock
    }

    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(response.into()));
    }

    pub fn push_error(&self, error: GenAiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl GenAiClient for MockGenAi {
    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenAiError::EmptyResponse))
    }
}
