use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::database::models::User;
use crate::database::repositories::UserRepository;
use crate::error::ApiError;
use crate::services::Actor;

/// The user behind the access token, freshly loaded from the database
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Role comes from the database row, not the token, so demotions apply immediately
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, self.0.role)
    }
}

/// Ensures the token's user still exists and is active
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let users = UserRepository::new(state.pool.clone())?;
    let user = users.find_by_id(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(user_id = auth_user.user_id, "Token refers to a user that no longer exists");
        ApiError::unauthorized("User not found")
    })?;

    if !user.is_active {
        tracing::warn!(user_id = user.id, "Rejected request from disabled account");
        return Err(ApiError::forbidden("Account is disabled"));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Restricts a route group to global admins. Runs after `validate_user_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        tracing::warn!(user_id = user.0.id, "Admin route denied");
        return Err(ApiError::forbidden("Admin privileges required"));
    }
    Ok(next.run(request).await)
}
