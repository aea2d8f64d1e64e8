// handlers/protected/projects/members.rs - Project membership

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::requests::AddMemberRequest;
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::{MemberDetail, ProjectMember};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

pub async fn member_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
) -> ApiResult<Vec<MemberDetail>> {
    let members = state.project_service()?.members(current.actor(), project_id).await?;
    Ok(ApiResponse::success(members))
}

/**
 * POST /api/v1/projects/:project_id/members
 *
 * ```json
 * { "user_id": 5, "role": "member" }   // role: owner | admin | member | viewer
 * ```
 *
 * 403 unless the caller can manage the project, 404 for an unknown user,
 * 409 if the user already belongs to the project.
 */
pub async fn member_add(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<AddMemberRequest>,
) -> ApiResult<ProjectMember> {
    let member = state
        .project_service()?
        .add_member(
            current.actor(),
            project_id,
            body.user_id,
            body.role.unwrap_or_default(),
        )
        .await?;
    Ok(ApiResponse::created(member).with_message("Member added successfully"))
}

pub async fn member_remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((project_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    state
        .project_service()?
        .remove_member(current.actor(), project_id, user_id)
        .await?;
    Ok(ApiResponse::no_content())
}
