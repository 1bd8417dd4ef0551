use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, MatchedPath, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::{errors::AppError, models::OptimizeRequest, state::AppState};

pub const OPTIMIZE_PATH: &str = "/api/optimize-resume";

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => AppError::Internal(format!("metrics render failed: {error}")).into_response(),
    }
}

pub async fn optimize_resume(
    State(state): State<AppState>,
    path: MatchedPath,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let _inflight = state.metrics.inflight_guard();

    let outcome = match body {
        Ok(Json(body)) => state.service.optimize(OptimizeRequest::from_json(body)).await,
        Err(rejection) => {
            debug!(error = %rejection, "rejected request body");
            Err(AppError::Validation("Invalid JSON body".to_owned()))
        }
    };

    let response = match outcome {
        Ok(result) => Json(result).into_response(),
        Err(error) => {
            state.metrics.observe_error(error.kind());
            error.into_response()
        }
    };

    state.metrics.observe_request(
        path.as_str(),
        "POST",
        response.status().as_u16(),
        started.elapsed(),
    );

    response
}
