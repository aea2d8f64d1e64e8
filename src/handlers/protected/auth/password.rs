// handlers/protected/auth/password.rs - PUT /auth/password

use axum::{extract::State, Extension};

use crate::api::requests::ChangePasswordRequest;
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

pub async fn password_put(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .auth_service()?
        .change_password(current.0.id, &body.current_password, &body.new_password)
        .await?;
    Ok(ApiResponse::message("Password updated successfully"))
}
