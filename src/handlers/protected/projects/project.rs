// handlers/protected/projects/project.rs - Project CRUD

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::api::format::ProjectView;
use crate::api::requests::{CreateProjectRequest, ProjectListQuery, UpdateProjectRequest};
use crate::api::{PageQuery, ValidatedJson};
use crate::app::AppState;
use crate::database::repositories::ProjectChanges;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/**
 * GET /api/v1/projects - Projects visible to the caller, newest first
 *
 * Query: `page`, `per_page`, `owner_id`, `search` (name contains), `is_active`.
 * Global admins see every project; everyone else sees projects they own or belong to.
 *
 * ```json
 * {
 *   "data": [ { "id": 3, "name": "API", "owner_id": 1, ... } ],
 *   "meta": { "total": 1, "page": 1, "per_page": 20, "total_pages": 1, "has_prev": false, "has_next": false }
 * }
 * ```
 */
pub async fn project_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ProjectListQuery>,
) -> ApiResult<Vec<ProjectView>> {
    let params = state.page(&page);
    let (projects, total) = state
        .project_service()?
        .list(current.actor(), filter.into_filter(), params.limit(), params.offset())
        .await?;

    let views = projects.into_iter().map(ProjectView::from).collect();
    Ok(ApiResponse::paginated(views, params.meta(total)))
}

/// The creator becomes the owner and is recorded as an `owner` member
pub async fn project_create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<ProjectView> {
    let detail = state
        .project_service()?
        .create(current.actor(), body.name.trim(), body.description.as_deref())
        .await?;
    Ok(ApiResponse::created(detail.into()).with_message("Project created successfully"))
}

pub async fn project_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
) -> ApiResult<ProjectView> {
    let detail = state.project_service()?.get(current.actor(), project_id).await?;
    Ok(ApiResponse::success(detail.into()))
}

pub async fn project_update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<ProjectView> {
    let changes = ProjectChanges {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
        is_active: body.is_active,
    };
    let detail = state
        .project_service()?
        .update(current.actor(), project_id, changes)
        .await?;
    Ok(ApiResponse::success(detail.into()).with_message("Project updated successfully"))
}

pub async fn project_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
) -> ApiResult<()> {
    state.project_service()?.delete(current.actor(), project_id).await?;
    Ok(ApiResponse::no_content())
}
