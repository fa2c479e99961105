use std::path::PathBuf;
use std::sync::Arc;

use crate::access::GateConfig;
use crate::backend::BackendClient;
use crate::config::{AppConfig, RateLimitConfig};

/// Shared, read-only request context. Built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub gate: Arc<GateConfig>,
    pub payment_key: Arc<str>,
    pub site_root: PathBuf,
    pub rate_limit: RateLimitConfig,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, backend: BackendClient) -> Self {
        Self {
            backend,
            gate: Arc::new(config.gate.clone()),
            payment_key: Arc::from(config.payment_key.as_str()),
            site_root: config.site_root.clone(),
            rate_limit: config.rate_limit,
            max_body_bytes: config.max_body_bytes,
        }
    }
}
