// handlers/public/labels.rs - GET /api/v1/labels[/:label_id]

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::Label;
use crate::middleware::{ApiResponse, ApiResult};

/// All labels, sorted by name
pub async fn labels_list(State(state): State<AppState>) -> ApiResult<Vec<Label>> {
    let labels = state.label_service()?.list().await?;
    Ok(ApiResponse::success(labels))
}

pub async fn label_get(State(state): State<AppState>, Path(label_id): Path<i64>) -> ApiResult<Label> {
    let label = state.label_service()?.get(label_id).await?;
    Ok(ApiResponse::success(label))
}
