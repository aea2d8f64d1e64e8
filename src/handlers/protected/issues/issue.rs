// handlers/protected/issues/issue.rs - Issue CRUD

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::api::format::{IssueDetailView, IssueView};
use crate::api::requests::{CreateIssueRequest, IssueListQuery, UpdateIssueRequest};
use crate::api::{PageQuery, ValidatedJson};
use crate::app::AppState;
use crate::database::repositories::IssueChanges;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/**
 * GET /api/v1/projects/:project_id/issues - Issues of one project, newest first
 *
 * Query: `page`, `per_page`, `status`, `priority`, `reporter_id`, `assignee_id`,
 * `search` (title or description contains). Unknown `status`/`priority`
 * values are a 422; malformed ids are ignored.
 */
pub async fn issue_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
    Query(page): Query<PageQuery>,
    Query(query): Query<IssueListQuery>,
) -> ApiResult<Vec<IssueView>> {
    let filter = query.into_filter()?;
    let params = state.page(&page);
    let (issues, total) = state
        .issue_service()?
        .list(current.actor(), project_id, filter, params.limit(), params.offset())
        .await?;

    let views = issues.into_iter().map(IssueView::from).collect();
    Ok(ApiResponse::paginated(views, params.meta(total)))
}

/**
 * POST /api/v1/projects/:project_id/issues
 *
 * ```json
 * { "title": "Crash on save", "description": "...", "priority": "high", "status": "open" }
 * ```
 *
 * The caller becomes the reporter and must be a contributing member of the project.
 */
pub async fn issue_create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<CreateIssueRequest>,
) -> ApiResult<IssueDetailView> {
    let detail = state
        .issue_service()?
        .create(
            current.actor(),
            project_id,
            body.title.trim(),
            body.description.as_deref(),
            body.status,
            body.priority,
        )
        .await?;
    Ok(ApiResponse::created(detail.into()).with_message("Issue created successfully"))
}

pub async fn issue_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
) -> ApiResult<IssueDetailView> {
    let detail = state.issue_service()?.get(current.actor(), issue_id).await?;
    Ok(ApiResponse::success(detail.into()))
}

pub async fn issue_update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateIssueRequest>,
) -> ApiResult<IssueDetailView> {
    let changes = IssueChanges {
        title: body.title.map(|t| t.trim().to_string()),
        description: body.description,
        status: body.status,
        priority: body.priority,
    };
    let detail = state
        .issue_service()?
        .update(current.actor(), issue_id, changes)
        .await?;
    Ok(ApiResponse::success(detail.into()).with_message("Issue updated successfully"))
}

pub async fn issue_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
) -> ApiResult<()> {
    state.issue_service()?.delete(current.actor(), issue_id).await?;
    Ok(ApiResponse::no_content())
}
