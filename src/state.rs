use std::sync::Arc;

use crate::{backend::ResumeBackend, metrics::AppMetrics, service::OptimizationService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OptimizationService>,
    pub metrics: Arc<AppMetrics>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ResumeBackend>) -> Self {
        Self {
            service: Arc::new(OptimizationService::new(backend)),
            metrics: Arc::new(AppMetrics::new()),
        }
    }
}
