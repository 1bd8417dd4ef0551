use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    backend::{BackendError, ResumeBackend},
    errors::AppError,
    models::{OptimizationRequest, OptimizationResult, OptimizeRequest},
    prompt,
};

/// Validates a request, renders the prompt for the configured backend, and
/// turns whatever the backend does into either a result or an [`AppError`].
///
/// One backend call per request, never retried.
pub struct OptimizationService {
    backend: Arc<dyn ResumeBackend>,
}

impl OptimizationService {
    pub fn new(backend: Arc<dyn ResumeBackend>) -> Self {
        Self { backend }
    }

    pub async fn optimize(&self, request: OptimizeRequest) -> Result<OptimizationResult, AppError> {
        let request = request.into_validated().map_err(AppError::Validation)?;
        self.optimize_validated(request).await
    }

    pub async fn optimize_validated(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizationResult, AppError> {
        let request_id = format!("opt_{}", Uuid::new_v4());
        let backend = self.backend.as_ref();
        let payload = prompt::build_for(&request, backend.prompt_mode());

        info!(
            request_id = %request_id,
            backend = backend.name(),
            model = backend.model(),
            tone = %request.tone,
            resume_chars = request.resume_text.len(),
            "optimization request dispatched"
        );

        match backend.invoke(payload).await {
            Ok(optimized) => {
                if optimized.is_empty() {
                    warn!(request_id = %request_id, "backend returned no content");
                }
                info!(
                    request_id = %request_id,
                    optimized_chars = optimized.len(),
                    "optimization complete"
                );
                Ok(OptimizationResult { optimized })
            }
            Err(error) => {
                let classified = classify(backend, error);
                warn!(
                    request_id = %request_id,
                    kind = classified.kind(),
                    status = classified.status().as_u16(),
                    error = %classified,
                    "optimization failed"
                );
                Err(classified)
            }
        }
    }
}

pub fn classify(backend: &dyn ResumeBackend, error: BackendError) -> AppError {
    match error {
        BackendError::Unreachable(detail) => {
            warn!(backend = backend.name(), detail = %detail, "backend unreachable");
            AppError::Connectivity(backend.unreachable_hint())
        }
        BackendError::Timeout(detail) => AppError::Timeout(format!(
            "{} did not respond in time: {detail}",
            backend.name()
        )),
        BackendError::Status { status, body } => {
            if backend.rejects_model(&body) {
                AppError::ModelConfiguration(backend.model_guidance())
            } else {
                AppError::Backend {
                    status,
                    message: format!("{} error: {body}", backend.name()),
                }
            }
        }
        BackendError::InvalidResponse(detail) => {
            warn!(backend = backend.name(), detail = %detail, "unreadable backend response");
            AppError::Internal("Server error".to_owned())
        }
    }
}
