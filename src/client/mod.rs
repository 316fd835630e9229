pub mod http;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::meals::dto::{
    CustomMealRequest, DeleteResponse, GenerateRequest, LogMealResponse, LogQuery,
    ManualMealRequest, ManualMealResponse, MealLogEntry, MealLogRequest, MealLogSummary,
    MealPlanSuggestion, OverrideRequest, Preferences,
};
use crate::nutrition::WeeklyProgress;

pub use http::HttpBackend;

/// The remote nutrition backend. Owns meal logs, preferences and plan
/// generation; the dashboard only reads, patches overrides, or deletes.
#[async_trait]
pub trait NutritionApi: Send + Sync {
    async fn weekly_progress(&self) -> Result<WeeklyProgress, ApiError>;

    async fn meal_logs(&self, query: LogQuery) -> Result<Vec<MealLogSummary>, ApiError>;

    async fn meal_log(&self, id: i64) -> Result<MealLogEntry, ApiError>;

    /// Full replacement of the meal's override set.
    async fn update_overrides(
        &self,
        id: i64,
        body: &OverrideRequest,
    ) -> Result<MealLogEntry, ApiError>;

    async fn log_meal(&self, body: &MealLogRequest) -> Result<LogMealResponse, ApiError>;

    async fn log_manual_meal(
        &self,
        body: &ManualMealRequest,
    ) -> Result<ManualMealResponse, ApiError>;

    async fn delete_meal_log(&self, id: i64) -> Result<DeleteResponse, ApiError>;

    async fn preferences(&self) -> Result<Preferences, ApiError>;

    async fn save_preferences(&self, body: &Preferences) -> Result<Preferences, ApiError>;

    async fn generate_meal_plan(
        &self,
        body: &GenerateRequest,
    ) -> Result<MealPlanSuggestion, ApiError>;

    async fn create_custom_meal(
        &self,
        body: &CustomMealRequest,
    ) -> Result<serde_json::Value, ApiError>;
}
