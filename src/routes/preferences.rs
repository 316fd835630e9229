use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, info, instrument};

use super::ProxyResult;
use crate::meals::dto::Preferences;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/preferences",
        get(get_preferences).post(save_preferences).put(update_preferences),
    )
}

#[instrument(skip(state))]
pub async fn get_preferences(State(state): State<AppState>) -> ProxyResult<Preferences> {
    state.backend.preferences().await.map(Json).map_err(|e| {
        error!(error = %e, "fetching preferences failed");
        e.into_proxy_response("Failed to fetch preferences")
    })
}

#[instrument(skip(state, body))]
pub async fn save_preferences(
    State(state): State<AppState>,
    Json(body): Json<Preferences>,
) -> ProxyResult<Preferences> {
    store(&state, &body, "Failed to save preferences").await
}

#[instrument(skip(state, body))]
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(body): Json<Preferences>,
) -> ProxyResult<Preferences> {
    store(&state, &body, "Failed to update preferences").await
}

async fn store(state: &AppState, body: &Preferences, fallback: &str) -> ProxyResult<Preferences> {
    match state.backend.save_preferences(body).await {
        Ok(saved) => {
            info!(complexity = %saved.meal_complexity, "preferences stored");
            Ok(Json(saved))
        }
        Err(e) => {
            error!(error = %e, "storing preferences failed");
            Err(e.into_proxy_response(fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeBackend;
    use crate::error::{ApiError, ErrorBody};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn json_request(method: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/preferences")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_fills_defaults_for_missing_fields() {
        let app = router().with_state(AppState::fake(Arc::new(FakeBackend::new())));
        let res = app
            .oneshot(Request::get("/preferences").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let prefs: Preferences = serde_json::from_slice(&body).unwrap();
        assert_eq!(prefs.cooking_time_preference, 30);
        assert_eq!(prefs.meal_complexity, "simple");
    }

    #[tokio::test]
    async fn put_replaces_preferences() {
        let fake = Arc::new(FakeBackend::new());
        let app = router().with_state(AppState::fake(fake.clone()));
        let res = app
            .oneshot(json_request(
                "PUT",
                json!({"preferred_ingredients": ["tofu"], "meal_complexity": "moderate"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(fake.call_count("save_preferences"), 1);
    }

    #[tokio::test]
    async fn backend_detail_is_passed_through() {
        let fake = Arc::new(FakeBackend::new());
        fake.fail_next(
            "save_preferences",
            ApiError::Status {
                status: 422,
                detail: Some("cooking_time_preference must be positive".into()),
            },
        );
        let app = router().with_state(AppState::fake(fake));
        let res = app
            .oneshot(json_request("POST", json!({"cooking_time_preference": 0})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let err: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "cooking_time_preference must be positive");
    }
}
