// handlers/health.rs - GET /health for the user and transaction services

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::database::Stores;

/// What a service health check needs to know
#[derive(Clone)]
pub struct HealthState {
    pub service: &'static str,
    pub stores: Stores,
}

/// GET /health - liveness plus a store round-trip
///
/// ```json
/// { "status": "ok", "service": "user_service", "database": "postgres", "timestamp": "..." }
/// ```
pub async fn health(State(health): State<HealthState>) -> Response {
    let now = chrono::Utc::now();

    match health.stores.health_check().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "service": health.service,
            "database": health.stores.backend_name(),
            "timestamp": now,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("{} health check failed: {}", health.service, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "service": health.service,
                    "database": "unavailable",
                    "timestamp": now,
                })),
            )
                .into_response()
        }
    }
}
