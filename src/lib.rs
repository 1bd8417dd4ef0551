pub mod backend;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod service;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use backend::{github::GithubModelsBackend, ollama::OllamaBackend, ResumeBackend};
use config::{AppConfig, BackendKind, ConfigError};
use tracing::info;

/// Builds the backend selected by `config` and wraps it in application state.
pub fn build_state(config: &AppConfig) -> Result<state::AppState, std::io::Error> {
    let backend: Arc<dyn ResumeBackend> = match config.backend {
        BackendKind::Ollama => Arc::new(
            OllamaBackend::new(config.ollama.clone(), config.request_timeout)
                .map_err(std::io::Error::other)?,
        ),
        BackendKind::GithubModels => {
            let github = config
                .github
                .clone()
                .ok_or_else(|| std::io::Error::other(ConfigError::MissingGithubToken))?;
            Arc::new(
                GithubModelsBackend::new(github, config.request_timeout)
                    .map_err(std::io::Error::other)?,
            )
        }
    };

    info!(
        backend = backend.name(),
        model = backend.model(),
        timeout_secs = config.request_timeout.as_secs(),
        "resume backend configured"
    );
    Ok(state::AppState::new(backend))
}

pub fn build_app(state: state::AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .route(handlers::OPTIMIZE_PATH, post(handlers::optimize_resume))
        .route("/api/optimize", post(handlers::optimize_resume))
        .with_state(state)
}
