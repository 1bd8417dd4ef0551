use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    backend::{map_transport_error, BackendError, ResumeBackend},
    config::GithubModelsConfig,
    models::{ChatRole, PromptMode, PromptPayload},
};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Hosted chat-completion service behind GitHub Models.
#[derive(Clone)]
pub struct GithubModelsBackend {
    client: reqwest::Client,
    config: GithubModelsConfig,
}

impl GithubModelsBackend {
    pub fn new(config: GithubModelsConfig, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| format!("failed to build GitHub Models HTTP client: {error}"))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ResumeBackend for GithubModelsBackend {
    fn name(&self) -> &str {
        "GitHub Models"
    }

    fn model(&self) -> &str {
        &self.config.model_id
    }

    fn prompt_mode(&self) -> PromptMode {
        PromptMode::Structured
    }

    async fn invoke(&self, payload: PromptPayload) -> Result<String, BackendError> {
        let body = json!({
            "model": self.config.model_id,
            "messages": payload
                .into_messages()
                .into_iter()
                .map(|message| json!({"role": role_name(&message.role), "content": message.content}))
                .collect::<Vec<_>>(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": false
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(API_VERSION_HEADER, &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed = match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(error) => {
                let snippet: String = text.chars().take(200).collect();
                warn!(
                    backend = self.name(),
                    error = %error,
                    body = %snippet,
                    "success body is not JSON"
                );
                Value::Null
            }
        };
        let content = completion_content(&parsed);
        debug!(
            backend = self.name(),
            model = %self.config.model_id,
            chars = content.len(),
            "chat completion complete"
        );
        Ok(content)
    }

    fn unreachable_hint(&self) -> String {
        format!(
            "Cannot reach GitHub Models endpoint at {}. Check network and token.",
            self.config.endpoint
        )
    }

    fn model_guidance(&self) -> String {
        format!(
            "Unknown model '{}'. Check that GITHUB_MODEL_ID is set to a model you can access (see https://github.com/marketplace/models and open the model's Playground -> Code tab).",
            self.config.model_id
        )
    }
}

/// Content of the first choice, accepting both chat and legacy completion shapes.
fn completion_content(parsed: &Value) -> String {
    let choice = parsed.pointer("/choices/0");
    choice
        .and_then(|choice| choice.pointer("/message/content"))
        .and_then(Value::as_str)
        .or_else(|| choice.and_then(|choice| choice.get("text")).and_then(Value::as_str))
        .unwrap_or_default()
        .to_owned()
}

fn role_name(role: &ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
    }
}
