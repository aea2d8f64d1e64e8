// handlers/protected/issues/assignments.rs - POST/DELETE /issues/:issue_id/assign

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::requests::AssignRequest;
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::Assignment;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// Assignees must belong to the issue's project
pub async fn assign_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<AssignRequest>,
) -> ApiResult<Assignment> {
    let assignment = state
        .issue_service()?
        .assign(current.actor(), issue_id, body.user_id)
        .await?;
    Ok(ApiResponse::created(assignment).with_message("User assigned successfully"))
}

pub async fn assign_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((issue_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    state
        .issue_service()?
        .unassign(current.actor(), issue_id, user_id)
        .await?;
    Ok(ApiResponse::no_content())
}
