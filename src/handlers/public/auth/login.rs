// handlers/public/auth/login.rs - POST /api/v1/auth/login handler

use axum::extract::State;

use crate::api::format::LoginView;
use crate::api::requests::LoginRequest;
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/**
 * POST /api/v1/auth/login - Exchange credentials for an access/refresh token pair
 *
 * Expected Input:
 * ```json
 * { "username": "jane_doe", "password": "Secret123" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "data": {
 *     "access_token": "eyJhbGciOiJIUzI1NiI...",
 *     "refresh_token": "eyJhbGciOiJIUzI1NiI...",
 *     "token_type": "Bearer",
 *     "expires_in": 900,
 *     "user": { "id": 1, "username": "jane_doe", "email": "jane@example.com", ... }
 *   },
 *   "message": "Login successful"
 * }
 * ```
 *
 * Unknown usernames and wrong passwords both answer 401 "Invalid credentials".
 */
pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginView> {
    let (user, tokens) = state
        .auth_service()?
        .login(&body.username, &body.password)
        .await?;

    Ok(ApiResponse::success(LoginView::new(&user, tokens)).with_message("Login successful"))
}
