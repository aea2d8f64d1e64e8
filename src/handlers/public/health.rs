// handlers/public/health.rs - GET /, /api/v1/health and /api/v1/ping

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};

/// Service index
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "data": {
            "name": state.config.app.name,
            "version": state.config.app.version,
            "endpoints": {
                "health": "/api/v1/health (public)",
                "ping": "/api/v1/ping (public)",
                "auth": "/api/v1/auth/{register,login,refresh} (public), /api/v1/auth/{me,logout,password} (protected)",
                "projects": "/api/v1/projects[/:project_id[/members|/issues]] (protected)",
                "issues": "/api/v1/issues/:issue_id[/assign|/labels|/comments] (protected)",
                "comments": "/api/v1/comments/:comment_id (protected)",
                "labels": "/api/v1/labels[/:label_id] (public reads, admin writes)",
            }
        }
    }))
}

/**
 * GET /api/v1/health - Liveness plus database connectivity
 *
 * 200 when `SELECT 1` succeeds, otherwise 503 with the same body shape:
 * ```json
 * {
 *   "data": {
 *     "status": "healthy",          // or "degraded"
 *     "service": "Issue Tracker API",
 *     "version": "1.0.0",
 *     "database": "healthy"         // or "unhealthy"
 *   }
 * }
 * ```
 */
pub async fn health_get(State(state): State<AppState>) -> Response {
    let database_ok = match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            false
        }
    };

    let body = json!({
        "status": if database_ok { "healthy" } else { "degraded" },
        "service": state.config.app.name,
        "version": state.config.app.version,
        "database": if database_ok { "healthy" } else { "unhealthy" },
    });

    if database_ok {
        ApiResponse::success(body).into_response()
    } else {
        ApiResponse::with_status(body, StatusCode::SERVICE_UNAVAILABLE)
            .with_message("Service degraded")
            .into_response()
    }
}

pub async fn ping_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "message": "pong" })))
}
