use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::NutritionApi;
use crate::config::AppConfig;
use crate::error::{detail_from_body, ApiError};
use crate::meals::dto::{
    CustomMealRequest, DeleteResponse, GenerateRequest, LogMealResponse, LogQuery,
    ManualMealRequest, ManualMealResponse, MealLogEntry, MealLogRequest, MealLogSummary,
    MealPlanSuggestion, OverrideRequest, Preferences,
};
use crate::nutrition::WeeklyProgress;

/// JSON-over-HTTP client for the nutrition backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(&config.backend_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let req = req.build().map_err(ApiError::from)?;
        let method = req.method().clone();
        let url = req.url().clone();
        debug!(%method, %url, "backend request");

        let response = self.client.execute(req).await.map_err(|e| {
            warn!(%method, %url, error = %e, "backend unreachable");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let detail = detail_from_body(&body);
            warn!(%method, %url, %status, detail = ?detail, "backend returned error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!(%method, %url, error = %e, "backend sent unexpected body");
            ApiError::from(e)
        })
    }
}

#[async_trait]
impl NutritionApi for HttpBackend {
    async fn weekly_progress(&self) -> Result<WeeklyProgress, ApiError> {
        self.send(self.request(Method::GET, "/nutrition/progress")).await
    }

    async fn meal_logs(&self, query: LogQuery) -> Result<Vec<MealLogSummary>, ApiError> {
        self.send(self.request(Method::GET, "/meals/log").query(&query)).await
    }

    async fn meal_log(&self, id: i64) -> Result<MealLogEntry, ApiError> {
        self.send(self.request(Method::GET, &format!("/meals/log/{id}"))).await
    }

    async fn update_overrides(
        &self,
        id: i64,
        body: &OverrideRequest,
    ) -> Result<MealLogEntry, ApiError> {
        self.send(self.request(Method::PATCH, &format!("/meals/log/{id}")).json(body)).await
    }

    async fn log_meal(&self, body: &MealLogRequest) -> Result<LogMealResponse, ApiError> {
        self.send(self.request(Method::POST, "/meals/log").json(body)).await
    }

    async fn log_manual_meal(
        &self,
        body: &ManualMealRequest,
    ) -> Result<ManualMealResponse, ApiError> {
        self.send(self.request(Method::POST, "/meals/manual").json(body)).await
    }

    async fn delete_meal_log(&self, id: i64) -> Result<DeleteResponse, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/meals/log/{id}"))).await
    }

    async fn preferences(&self) -> Result<Preferences, ApiError> {
        self.send(self.request(Method::GET, "/preferences")).await
    }

    async fn save_preferences(&self, body: &Preferences) -> Result<Preferences, ApiError> {
        self.send(self.request(Method::POST, "/preferences").json(body)).await
    }

    async fn generate_meal_plan(
        &self,
        body: &GenerateRequest,
    ) -> Result<MealPlanSuggestion, ApiError> {
        self.send(self.request(Method::POST, "/meals/generate").json(body)).await
    }

    async fn create_custom_meal(
        &self,
        body: &CustomMealRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.send(self.request(Method::POST, "/meals/custom").json(body)).await
    }
}
