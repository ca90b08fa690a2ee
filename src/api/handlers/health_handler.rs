//! Health check handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use crate::api::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: ServiceStatus,
}

/// Individual service status.
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub database: ServiceHealth,
}

/// Service health with optional error message.
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Health check endpoint - verifies the store can reach its backend.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match state.users.ping().await {
        Ok(()) => ServiceHealth {
            status: "healthy",
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            ServiceHealth {
                status: "unhealthy",
                error: Some(e.to_string()),
            }
        }
    };

    let all_healthy = database.error.is_none();
    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceStatus { database },
    };

    if all_healthy {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    }
}
