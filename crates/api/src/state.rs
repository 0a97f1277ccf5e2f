use std::sync::Arc;

use scanner::LogScanner;

use crate::config::ApiConfig;
use crate::metrics::ServiceMetrics;

/// Shared application state (thread-safe)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub scanner: Arc<LogScanner>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(config: ApiConfig, scanner: LogScanner) -> Self {
        Self {
            config: Arc::new(config),
            scanner: Arc::new(scanner),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}
