// handlers/protected/comments.rs - Issue comments

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use crate::api::format::CommentView;
use crate::api::requests::CommentRequest;
use crate::api::{PageQuery, ValidatedJson};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /api/v1/issues/:issue_id/comments - oldest first, paginated
pub async fn comment_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<CommentView>> {
    let params = state.page(&page);
    let (comments, total) = state
        .comment_service()?
        .list(current.actor(), issue_id, params.limit(), params.offset())
        .await?;

    let views = comments.into_iter().map(CommentView::from).collect();
    Ok(ApiResponse::paginated(views, params.meta(total)))
}

pub async fn comment_create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> ApiResult<CommentView> {
    let comment = state
        .comment_service()?
        .create(current.actor(), issue_id, &body.content)
        .await?;
    Ok(ApiResponse::created(comment.into()).with_message("Comment created successfully"))
}

/// Only the author or a project owner/admin may edit
pub async fn comment_update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(comment_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<CommentRequest>,
) -> ApiResult<CommentView> {
    let comment = state
        .comment_service()?
        .update(current.actor(), comment_id, &body.content)
        .await?;
    Ok(ApiResponse::success(comment.into()).with_message("Comment updated successfully"))
}

pub async fn comment_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(comment_id): Path<i64>,
) -> ApiResult<()> {
    state
        .comment_service()?
        .delete(current.actor(), comment_id)
        .await?;
    Ok(ApiResponse::no_content())
}
