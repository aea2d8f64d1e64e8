// handlers/public/auth/register.rs - POST /api/v1/auth/register handler

use axum::extract::State;

use crate::api::format::UserView;
use crate::api::requests::RegisterRequest;
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Registration;

/**
 * POST /api/v1/auth/register - Create a user account
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "jane_doe",
 *   "email": "jane@example.com",
 *   "password": "Secret123",
 *   "role": "developer"        // optional, defaults to developer
 * }
 * ```
 *
 * Expected Output (201):
 * ```json
 * {
 *   "data": { "id": 1, "username": "jane_doe", "email": "jane@example.com", "role": "developer", ... },
 *   "message": "User registered successfully"
 * }
 * ```
 */
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> ApiResult<UserView> {
    let user = state
        .auth_service()?
        .register(Registration {
            username: body.username,
            email: body.email,
            password: body.password,
            role: body.role.unwrap_or_default(),
        })
        .await?;

    Ok(ApiResponse::created(UserView::own_profile(&user)).with_message("User registered successfully"))
}
