use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::ProxyResult;
use crate::meals::dto::{
    CustomMealRequest, DeleteResponse, GenerateRequest, LogMealResponse, LogQuery,
    ManualMealRequest, ManualMealResponse, MealLogEntry, MealLogRequest, MealLogSummary,
    MealPlanSuggestion, OverrideRequest,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogListParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_limit() -> usize {
    10
}

fn default_days() -> u32 {
    7
}

impl From<LogListParams> for LogQuery {
    fn from(p: LogListParams) -> Self {
        LogQuery {
            limit: p.limit,
            offset: p.offset,
            days: p.days,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meals/log", get(list_logs).post(log_meal))
        .route(
            "/meals/log/:id",
            get(get_log).patch(update_log).delete(delete_log),
        )
        .route("/meals/generate", post(generate))
        .route("/meals/manual", post(log_manual))
        .route("/meals/custom", post(create_custom))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(p): Query<LogListParams>,
) -> ProxyResult<Vec<MealLogSummary>> {
    let query = LogQuery::from(p);
    match state.backend.meal_logs(query).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            error!(error = %e, offset = query.offset, "fetching meal logs failed");
            Err(e.into_proxy_response("Failed to fetch meal logs"))
        }
    }
}

#[instrument(skip(state, body), fields(meal = %body.meal_name))]
pub async fn log_meal(
    State(state): State<AppState>,
    Json(body): Json<MealLogRequest>,
) -> ProxyResult<LogMealResponse> {
    match state.backend.log_meal(&body).await {
        Ok(res) => {
            info!(id = res.id, "meal logged");
            Ok(Json(res))
        }
        Err(e) => {
            error!(error = %e, "logging meal failed");
            Err(e.into_proxy_response("Failed to log meal"))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ProxyResult<MealLogEntry> {
    state.backend.meal_log(id).await.map(Json).map_err(|e| {
        error!(error = %e, id, "fetching meal detail failed");
        e.into_proxy_response("Failed to fetch meal detail")
    })
}

#[instrument(skip(state, body))]
pub async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<OverrideRequest>,
) -> ProxyResult<MealLogEntry> {
    match state.backend.update_overrides(id, &body).await {
        Ok(entry) => {
            info!(id, overrides = entry.override_nutrition.len(), "meal overrides replaced");
            Ok(Json(entry))
        }
        Err(e) => {
            error!(error = %e, id, "updating meal detail failed");
            Err(e.into_proxy_response("Failed to update meal detail"))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ProxyResult<DeleteResponse> {
    match state.backend.delete_meal_log(id).await {
        Ok(res) => {
            info!(id, "meal log deleted");
            Ok(Json(res))
        }
        Err(e) => {
            error!(error = %e, id, "deleting meal log failed");
            Err(e.into_proxy_response("Failed to delete meal"))
        }
    }
}

#[instrument(skip(state, body))]
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> ProxyResult<MealPlanSuggestion> {
    state
        .backend
        .generate_meal_plan(&body)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, "meal plan generation failed");
            e.into_proxy_response("Failed to generate meal suggestions")
        })
}

#[instrument(skip(state, body), fields(meal = %body.meal_name))]
pub async fn log_manual(
    State(state): State<AppState>,
    Json(body): Json<ManualMealRequest>,
) -> ProxyResult<ManualMealResponse> {
    match state.backend.log_manual_meal(&body).await {
        Ok(res) => {
            info!(id = res.id, "manual meal logged");
            Ok(Json(res))
        }
        Err(e) => {
            error!(error = %e, "manual meal logging failed");
            Err(e.into_proxy_response("Failed to log manual meal"))
        }
    }
}

#[instrument(skip(state, body), fields(meal = %body.name))]
pub async fn create_custom(
    State(state): State<AppState>,
    Json(body): Json<CustomMealRequest>,
) -> ProxyResult<serde_json::Value> {
    state
        .backend
        .create_custom_meal(&body)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, "custom meal creation failed");
            e.into_proxy_response("Failed to save custom meal")
        })
}
