use std::sync::Arc;

use crate::application::RagService;
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(rag: Arc<RagService>, config: AppConfig) -> Self {
        Self {
            rag,
            config: Arc::new(config),
        }
    }
}
