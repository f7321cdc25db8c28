use musegen_core::{AppConfig, GenerationConfig, ResponseMode};
use musegen_engine::ModelService;
use std::sync::Arc;

/// Shared handler state: the model service plus the settings a request needs.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ModelService>,
    pub generation: GenerationConfig,
    pub response_mode: ResponseMode,
}

impl AppState {
    pub fn new(service: Arc<ModelService>, config: &AppConfig) -> Self {
        Self {
            service,
            generation: config.generation.clone(),
            response_mode: config.server.response_mode,
        }
    }
}
