// handlers/elevated/labels.rs - POST /labels, PUT/DELETE /labels/:label_id

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::requests::{CreateLabelRequest, UpdateLabelRequest};
use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::Label;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/**
 * POST /api/v1/labels - Create a global label
 *
 * ```json
 * { "name": "bug", "color": "#FF0000" }   // color defaults to #808080
 * ```
 *
 * 409 when a label with the same name exists.
 */
pub async fn label_create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateLabelRequest>,
) -> ApiResult<Label> {
    let label = state
        .label_service()?
        .create(current.actor(), body.name.trim(), body.color.as_deref())
        .await?;
    Ok(ApiResponse::created(label).with_message("Label created successfully"))
}

pub async fn label_update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(label_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateLabelRequest>,
) -> ApiResult<Label> {
    let name = body.name.as_deref().map(str::trim);
    let label = state
        .label_service()?
        .update(current.actor(), label_id, name, body.color.as_deref())
        .await?;
    Ok(ApiResponse::success(label).with_message("Label updated successfully"))
}

pub async fn label_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(label_id): Path<i64>,
) -> ApiResult<()> {
    state.label_service()?.delete(current.actor(), label_id).await?;
    Ok(ApiResponse::no_content())
}
