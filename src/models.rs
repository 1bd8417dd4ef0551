use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TARGET_ROLE: &str = "Frontend Developer";

/// Body of `POST /api/optimize-resume` as sent by the browser.
///
/// Fields stay as raw JSON so that a wrong type surfaces as a validation
/// error rather than a deserializer rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default)]
    pub resume_text: Option<Value>,
    #[serde(default)]
    pub job_description: Option<Value>,
    #[serde(default)]
    pub tone: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationRequest {
    pub resume_text: String,
    pub job_description: String,
    pub tone: Tone,
}

impl OptimizeRequest {
    /// Reads the request fields from any JSON body; non-object bodies carry no fields.
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Object(_) => serde_json::from_value(body).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    pub fn into_validated(self) -> Result<OptimizationRequest, String> {
        let resume_text = match self.resume_text {
            Some(Value::String(text)) if !text.is_empty() => text,
            _ => return Err("Missing resumeText".to_owned()),
        };

        Ok(OptimizationRequest {
            resume_text,
            job_description: normalize_job_description(as_text(self.job_description.as_ref())),
            tone: Tone::parse(as_text(self.tone.as_ref())),
        })
    }
}

fn as_text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or_default()
}

pub fn normalize_job_description(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_TARGET_ROLE.to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Impactful,
    AtsFocused,
    /// A label outside the known set, passed to the model as given.
    Other(String),
}

impl Tone {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" => Tone::Professional,
            "Professional" => Tone::Professional,
            "Casual" => Tone::Casual,
            "Impactful" => Tone::Impactful,
            "ATS-Focused" => Tone::AtsFocused,
            other => Tone::Other(other.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Impactful => "Impactful",
            Tone::AtsFocused => "ATS-Focused",
            Tone::Other(label) => label,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// One flat instruction block, for generate-style backends.
    SingleString,
    /// System guidelines plus a user message, for chat-style backends.
    Structured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPayload {
    Generate { prompt: String },
    Chat { messages: Vec<ChatMessage> },
}

impl PromptPayload {
    pub fn into_prompt(self) -> String {
        match self {
            PromptPayload::Generate { prompt } => prompt,
            PromptPayload::Chat { messages } => messages
                .into_iter()
                .map(|message| message.content)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            PromptPayload::Generate { prompt } => vec![ChatMessage::user(prompt)],
            PromptPayload::Chat { messages } => messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationResult {
    pub optimized: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
