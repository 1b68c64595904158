use crate::domain::repositories::LogRepository;
use crate::infrastructure::ConnectionRegistry;
use crate::services::log_service::LogService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub logs: LogService,
    pub connections: ConnectionRegistry,
}

impl AppState {
    pub fn new(log_repository: Arc<dyn LogRepository>) -> Self {
        Self {
            logs: LogService::new(log_repository),
            connections: ConnectionRegistry::new(),
        }
    }
}
