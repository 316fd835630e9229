use std::sync::Arc;

use crate::client::{HttpBackend, NutritionApi};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn NutritionApi>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let backend = Arc::new(HttpBackend::from_config(&config)?) as Arc<dyn NutritionApi>;
        tracing::info!(base_url = %config.backend_base_url, "nutrition backend configured");
        Ok(Self { config, backend })
    }

    pub fn from_parts(config: Arc<AppConfig>, backend: Arc<dyn NutritionApi>) -> Self {
        Self { config, backend }
    }

    #[cfg(test)]
    pub fn fake(backend: Arc<crate::client::testing::FakeBackend>) -> Self {
        let config = Arc::new(AppConfig {
            backend_base_url: "http://fake.local/api".into(),
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout_secs: 5,
            dashboard: crate::config::DashboardConfig::default(),
        });
        Self::from_parts(config, backend)
    }
}
