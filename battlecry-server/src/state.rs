use crate::services::file_store::FileStore;
use battlecry_sandbox::CompileService;
use std::sync::Arc;

/// Shared handler state, cloned into every actix worker
#[derive(Clone)]
pub struct AppState {
    pub compile_service: Arc<CompileService>,
    pub file_store: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(compile_service: CompileService, file_store: Arc<dyn FileStore>) -> Self {
        Self {
            compile_service: Arc::new(compile_service),
            file_store,
        }
    }
}
