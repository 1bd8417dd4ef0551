use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::{BackendError, ResumeBackend};
use crate::models::{PromptMode, PromptPayload};

/// Scripted outcome replayed by [`MockBackend`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Content(String),
    Unreachable,
    Timeout,
    Status { status: u16, body: String },
}

/// In-process backend that replays scripted replies and records what it was sent.
///
/// Once the script runs out it echoes the last user-visible line of the prompt.
pub struct MockBackend {
    name: String,
    model: String,
    mode: PromptMode,
    script: Mutex<VecDeque<MockReply>>,
    payloads: Mutex<Vec<PromptPayload>>,
    calls: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            name: "mock-backend".to_owned(),
            model: "mock-model".to_owned(),
            mode: PromptMode::Structured,
            script: Mutex::new(VecDeque::new()),
            payloads: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockBackend {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_replies(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..self
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn payloads(&self) -> Vec<PromptPayload> {
        self.payloads.lock().await.clone()
    }
}

#[async_trait]
impl ResumeBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn prompt_mode(&self) -> PromptMode {
        self.mode
    }

    async fn invoke(&self, payload: PromptPayload) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().await.push(payload.clone());

        let next = self.script.lock().await.pop_front();
        debug!(backend = %self.name, scripted = next.is_some(), "mock invoked");
        match next {
            Some(MockReply::Content(content)) => Ok(content),
            Some(MockReply::Unreachable) => Err(BackendError::Unreachable(
                "connection refused".to_owned(),
            )),
            Some(MockReply::Timeout) => Err(BackendError::Timeout(
                "operation timed out".to_owned(),
            )),
            Some(MockReply::Status { status, body }) => Err(BackendError::Status { status, body }),
            None => Ok(echo_response(payload)),
        }
    }

    fn unreachable_hint(&self) -> String {
        format!("Cannot reach {}. Is it running?", self.name)
    }

    fn model_guidance(&self) -> String {
        format!("Unknown model '{}'. Pick one of the mock models.", self.model)
    }
}

fn echo_response(payload: PromptPayload) -> String {
    let prompt = payload.into_prompt();
    let last_line = prompt
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("hello");
    format!("# Mock Resume\n\n{last_line}")
}
