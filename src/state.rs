use std::{sync::Arc, time::Instant};

use crate::{
    config::AppConfig,
    middleware::rate_limit::UploadRateLimiter,
    services::{storage_service::ObjectStore, upload_service::UploadService},
};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub uploads: UploadService,
    pub limiter: Arc<UploadRateLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ObjectStore>) -> Self {
        let config = Arc::new(config);
        Self {
            uploads: UploadService::new(config.clone(), store),
            limiter: Arc::new(UploadRateLimiter::new(config.rate_limit)),
            config,
            started_at: Instant::now(),
        }
    }
}
