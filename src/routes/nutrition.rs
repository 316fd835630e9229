use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, instrument};

use super::ProxyResult;
use crate::nutrition::WeeklyProgress;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/nutrition/progress", get(weekly_progress))
}

#[instrument(skip(state))]
pub async fn weekly_progress(State(state): State<AppState>) -> ProxyResult<WeeklyProgress> {
    match state.backend.weekly_progress().await {
        Ok(progress) => Ok(Json(progress)),
        Err(e) => {
            error!(error = %e, "fetching nutrition progress failed");
            Err(e.into_proxy_response("Failed to fetch nutrition progress"))
        }
    }
}
