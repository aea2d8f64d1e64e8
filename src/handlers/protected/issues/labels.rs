// handlers/protected/issues/labels.rs - POST/DELETE /issues/:issue_id/labels

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::requests::AddLabelRequest;
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::Label;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// Responds with the issue's full label set after the change
pub async fn label_add(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(issue_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<AddLabelRequest>,
) -> ApiResult<Vec<Label>> {
    let labels = state
        .issue_service()?
        .add_label(current.actor(), issue_id, body.label_id)
        .await?;
    Ok(ApiResponse::created(labels).with_message("Label added successfully"))
}

pub async fn label_remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((issue_id, label_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    state
        .issue_service()?
        .remove_label(current.actor(), issue_id, label_id)
        .await?;
    Ok(ApiResponse::no_content())
}
