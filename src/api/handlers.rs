use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::redis::RedisHealth;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let api = state.settings().api();
    Json(RootResponse {
        message: api.project_name.clone(),
        version: api.version.clone(),
        api_prefix: api.api_v1_str.clone(),
    })
}

/// 503 only when the database is unreachable. A missing cache leaves the service usable.
pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut components = HashMap::new();

    let redis_status = match state.redis().health().await {
        RedisHealth::Healthy => "healthy".to_string(),
        RedisHealth::Disconnected => "disconnected".to_string(),
        RedisHealth::Unhealthy(error) => format!("unhealthy: {error}"),
    };
    let cache_degraded = redis_status.starts_with("unhealthy");
    components.insert("redis".to_string(), redis_status);

    let database_error = state.store().ping().await.err();
    components.insert(
        "database".to_string(),
        database_error
            .as_ref()
            .map_or_else(|| "healthy".to_string(), |err| format!("unhealthy: {err}")),
    );

    let (code, status) = match (database_error.is_some(), cache_degraded) {
        (true, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        (false, true) => (StatusCode::OK, "degraded"),
        (false, false) => (StatusCode::OK, "healthy"),
    };

    (
        code,
        Json(HealthResponse {
            service: "quizhub-api".to_string(),
            status: status.to_string(),
            components,
        }),
    )
}

pub(crate) async fn metrics() -> impl IntoResponse {
    match metrics::render() {
        Some(body) => {
            ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response()
        }
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
