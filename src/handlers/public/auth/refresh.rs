// handlers/public/auth/refresh.rs - POST /api/v1/auth/refresh handler

use axum::{extract::State, http::HeaderMap};
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::auth::bearer_token;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct RefreshView {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Takes the refresh token in `Authorization: Bearer <refresh token>` and
/// returns a new access token. Access tokens are rejected here.
pub async fn refresh_post(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<RefreshView> {
    let token = bearer_token(&headers)?;
    let (_, access_token) = state.auth_service()?.refresh(token).await?;

    Ok(ApiResponse::success(RefreshView {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.security.access_token_expires_secs,
    })
    .with_message("Token refreshed successfully"))
}
