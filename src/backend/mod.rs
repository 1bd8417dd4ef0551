pub mod github;
pub mod mock;
pub mod ollama;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{PromptMode, PromptPayload};

/// Wire contract of one LLM backend.
///
/// `invoke` returns the generated text, or an empty string when the backend
/// answered successfully without a recognizable content field.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    fn prompt_mode(&self) -> PromptMode;
    async fn invoke(&self, payload: PromptPayload) -> Result<String, BackendError>;
    /// Operator-facing message used when the backend cannot be reached.
    fn unreachable_hint(&self) -> String;
    /// Where valid model identifiers for this backend can be found.
    fn model_guidance(&self) -> String;

    /// Whether a non-success body means the configured model was rejected.
    fn rejects_model(&self, body: &str) -> bool {
        error_code(body).contains(UNKNOWN_MODEL_CODE)
    }
}

const UNKNOWN_MODEL_CODE: &str = "unknown_model";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("backend timeout: {0}")]
    Timeout(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend invalid response: {0}")]
    InvalidResponse(String),
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout(error.to_string())
    } else if error.is_connect() {
        BackendError::Unreachable(error.to_string())
    } else {
        BackendError::InvalidResponse(error.to_string())
    }
}

/// Best-effort extraction of an error code from a backend error body.
///
/// Error formats are not contractual, so this tries `error.code`, `code` and
/// `error.message` in turn and falls back to the raw text when the body is
/// not JSON or carries none of them.
pub fn error_code(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    let candidates = [
        parsed.pointer("/error/code"),
        parsed.get("code"),
        parsed.pointer("/error/message"),
    ];
    let code = candidates
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.to_owned());
    code
}
