// handlers/protected/auth/session.rs - GET /auth/me and POST /auth/logout

use axum::Extension;

use crate::api::format::UserView;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// The caller's own profile, email included
pub async fn me_get(Extension(current): Extension<CurrentUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(UserView::own_profile(&current.0)))
}

/// Tokens are stateless; clients discard them. Recorded for the audit trail only.
pub async fn logout_post(Extension(current): Extension<CurrentUser>) -> ApiResult<()> {
    tracing::info!(user_id = current.0.id, username = %current.0.username, "User logged out");
    Ok(ApiResponse::message("Logout successful"))
}
