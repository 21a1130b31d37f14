use crate::transport::http::types::{AppState, HealthResponse, STATUS_DOWN, STATUS_UP};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (store reachable)", body = HealthResponse),
        (status = 503, description = "Service is unhealthy (store unreachable)", body = HealthResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: STATUS_UP.to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: STATUS_DOWN.to_string(),
                }),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/sanity",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn sanity_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_UP.to_string(),
    })
}
