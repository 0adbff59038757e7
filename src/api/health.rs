use crate::api::AppState;
use crate::api::schemas::health::{HealthResponse, Liveness};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns `{"status":"ok"}` as long as the server is running.
pub async fn health() -> impl IntoResponse {
    Json(Liveness { status: "ok".to_string() })
}

/// Readiness probe: checks that the token store answers.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let (status_code, store_status) = match state.health_service.check_store().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, component = "token_store", "Readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "error")
        }
    };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK { "ok" } else { "error" }.to_string(),
        token_store: store_status.to_string(),
    };

    (status_code, Json(response))
}
