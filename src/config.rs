use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const GITHUB_MODELS_ENDPOINT: &str = "https://models.github.ai/inference/chat/completions";
pub const DEFAULT_GITHUB_MODEL_ID: &str = "openai/gpt-4.1";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid RESUME_BIND_ADDR '{value}': {reason}")]
    BindAddr { value: String, reason: String },
    #[error("unknown RESUME_BACKEND '{0}', expected 'ollama' or 'github'")]
    UnknownBackend(String),
    #[error("GITHUB_MODELS_TOKEN must be set when the github backend is selected")]
    MissingGithubToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    GithubModels,
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub num_predict: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_owned(),
            model: DEFAULT_OLLAMA_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            num_predict: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GithubModelsConfig {
    pub endpoint: String,
    pub model_id: String,
    pub token: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GithubModelsConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            endpoint: GITHUB_MODELS_ENDPOINT.to_owned(),
            model_id: DEFAULT_GITHUB_MODEL_ID.to_owned(),
            token: token.into(),
            api_version: GITHUB_API_VERSION.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Process-wide settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendKind,
    pub ollama: OllamaConfig,
    pub github: Option<GithubModelsConfig>,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_value = lookup("RESUME_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_owned());
        let bind_addr = bind_value
            .parse::<SocketAddr>()
            .map_err(|error| ConfigError::BindAddr {
                value: bind_value.clone(),
                reason: error.to_string(),
            })?;

        let token = non_empty("GITHUB_MODELS_TOKEN");
        let backend = match non_empty("RESUME_BACKEND") {
            Some(value) => parse_backend_kind(&value)?,
            None if token.is_some() => BackendKind::GithubModels,
            None => BackendKind::Ollama,
        };

        let github = token.map(|token| GithubModelsConfig {
            model_id: non_empty("GITHUB_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_GITHUB_MODEL_ID.to_owned()),
            ..GithubModelsConfig::with_token(token)
        });
        if backend == BackendKind::GithubModels && github.is_none() {
            return Err(ConfigError::MissingGithubToken);
        }

        let ollama = OllamaConfig {
            base_url: non_empty("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            model: non_empty("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_owned()),
            ..OllamaConfig::default()
        };

        let timeout_secs = lookup("RESUME_BACKEND_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            bind_addr,
            backend,
            ollama,
            github,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub fn parse_backend_kind(value: &str) -> Result<BackendKind, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "ollama" | "local" => Ok(BackendKind::Ollama),
        "github" | "github-models" | "hosted" => Ok(BackendKind::GithubModels),
        other => Err(ConfigError::UnknownBackend(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_ollama_without_a_token() {
        let config = config_from(&[]).expect("empty environment is valid");

        assert_eq!(config.backend, BackendKind::Ollama);
        assert!(config.github.is_none());
        assert_eq!(config.ollama.base_url, DEFAULT_OLLAMA_BASE_URL);
        assert_eq!(config.ollama.model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn token_selects_github_when_backend_is_unset() {
        let config = config_from(&[
            ("GITHUB_MODELS_TOKEN", "ghp_test"),
            ("GITHUB_MODEL_ID", "meta/llama-3.3-70b"),
        ])
        .expect("token-only environment is valid");

        assert_eq!(config.backend, BackendKind::GithubModels);
        let github = config.github.expect("github settings");
        assert_eq!(github.token, "ghp_test");
        assert_eq!(github.model_id, "meta/llama-3.3-70b");
    }

    #[test]
    fn explicit_backend_overrides_token_presence() {
        let config = config_from(&[("GITHUB_MODELS_TOKEN", "ghp_test"), ("RESUME_BACKEND", "ollama")])
            .expect("explicit ollama is valid");
        assert_eq!(config.backend, BackendKind::Ollama);
    }

    #[test]
    fn github_without_token_is_a_startup_error() {
        for pairs in [
            vec![("RESUME_BACKEND", "github")],
            vec![("RESUME_BACKEND", "github"), ("GITHUB_MODELS_TOKEN", "   ")],
        ] {
            let error = config_from(&pairs).expect_err("github needs a token");
            assert!(matches!(error, ConfigError::MissingGithubToken));
        }
    }

    #[test]
    fn unparsable_timeout_falls_back_to_default() {
        let config = config_from(&[("RESUME_BACKEND_TIMEOUT_SECS", "soon")]).expect("valid config");
        assert_eq!(config.request_timeout, Duration::from_secs(120));

        let config = config_from(&[("RESUME_BACKEND_TIMEOUT_SECS", "15")]).expect("valid config");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let error = config_from(&[("RESUME_BIND_ADDR", "not-an-addr")]).expect_err("bad address");
        assert!(matches!(error, ConfigError::BindAddr { .. }));
    }

    #[test]
    fn backend_kind_accepts_aliases() {
        assert_eq!(parse_backend_kind("Ollama").unwrap(), BackendKind::Ollama);
        assert_eq!(parse_backend_kind(" github ").unwrap(), BackendKind::GithubModels);
        assert_eq!(parse_backend_kind("hosted").unwrap(), BackendKind::GithubModels);
    }

    #[test]
    fn backend_kind_rejects_unknown_names() {
        let error = parse_backend_kind("bedrock").expect_err("unknown backend should fail");
        assert!(error.to_string().contains("bedrock"));
    }

    #[test]
    fn github_defaults_match_hosted_service() {
        let config = GithubModelsConfig::with_token("tok");
        assert_eq!(config.endpoint, GITHUB_MODELS_ENDPOINT);
        assert_eq!(config.model_id, "openai/gpt-4.1");
        assert_eq!(config.api_version, "2022-11-28");
        assert_eq!(config.max_tokens, 2000);
    }
}
