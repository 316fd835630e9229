use std::time::Duration;

use anyhow::Context;

pub const HISTORY_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub history_page_size: usize,
    pub history_days: u32,
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_page_size: HISTORY_PAGE_SIZE,
            history_days: 36500,
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_base_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = DashboardConfig::default();
        let backend_base_url = std::env::var("NUTRITION_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api".into())
            .trim_end_matches('/')
            .to_string();
        let dashboard = DashboardConfig {
            history_page_size: HISTORY_PAGE_SIZE,
            history_days: std::env::var("HISTORY_DAYS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.history_days),
            recent_limit: std::env::var("RECENT_MEALS_LIMIT")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.recent_limit),
        };
        Ok(Self {
            backend_base_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("APP_PORT must be a port number")?
                .unwrap_or(8080),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            dashboard,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
