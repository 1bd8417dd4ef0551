use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    backend::{map_transport_error, BackendError, ResumeBackend},
    config::OllamaConfig,
    models::{PromptMode, PromptPayload},
};

/// Local generation service speaking the Ollama `/api/generate` protocol.
#[derive(Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| format!("failed to build Ollama HTTP client: {error}"))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ResumeBackend for OllamaBackend {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn prompt_mode(&self) -> PromptMode {
        PromptMode::SingleString
    }

    async fn invoke(&self, payload: PromptPayload) -> Result<String, BackendError> {
        let body = json!({
            "model": self.config.model,
            "prompt": payload.into_prompt(),
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.num_predict
            }
        });

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown backend error".to_owned());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|error| BackendError::InvalidResponse(error.to_string()))?;
        let content = parsed.response.unwrap_or_default();
        debug!(
            backend = self.name(),
            model = %self.config.model,
            chars = content.len(),
            "generation complete"
        );
        Ok(content)
    }

    fn unreachable_hint(&self) -> String {
        format!(
            "Cannot reach Ollama at {}. Is it running? Try `ollama serve`.",
            self.config.base_url
        )
    }

    fn model_guidance(&self) -> String {
        format!(
            "Unknown model '{}'. Check that OLLAMA_MODEL names a model you have pulled (run `ollama list`, or `ollama pull {}`).",
            self.config.model, self.config.model
        )
    }

    fn rejects_model(&self, body: &str) -> bool {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|parsed| parsed.get("error")?.as_str().map(is_missing_model_message))
            .unwrap_or(false)
    }
}

/// Ollama reports unpulled models as `model '<name>' not found, try pulling it first`.
fn is_missing_model_message(message: &str) -> bool {
    message.starts_with("model ") && message.contains("not found")
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: Option<String>,
}
