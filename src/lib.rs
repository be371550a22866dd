pub mod analysis;
pub mod api;
pub mod config;
pub mod errors;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod services;

use crate::config::AppConfig;
use crate::services::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions = SessionStore::new(config.session_ttl());
        Self {
            config,
            sessions,
            metrics_handle: crate::metrics::init_metrics(),
        }
    }
}
