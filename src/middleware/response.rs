use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::api::PageMeta;

/// Success envelope: `{ "data": ..., "message"?: "...", "meta"?: {...} }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Value>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data: Some(data),
            message: None,
            meta: None,
            status_code,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_meta(mut self, meta: impl Serialize) -> Self {
        self.meta = serde_json::to_value(meta).ok();
        self
    }

    /// 200 OK with pagination metadata
    pub fn paginated(data: T, meta: PageMeta) -> Self {
        Self::success(data).with_meta(meta)
    }
}

impl ApiResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self {
            data: None,
            message: None,
            meta: None,
            status_code: StatusCode::NO_CONTENT,
        }
    }

    /// 200 OK carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            meta: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        // For 204 No Content, return empty response
        if self.status_code == StatusCode::NO_CONTENT {
            return self.status_code.into_response();
        }

        let mut envelope = Map::new();
        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => {
                    envelope.insert("data".into(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return crate::error::ApiError::internal_server_error(
                        "Failed to serialize response data",
                    )
                    .into_response();
                }
            }
        }
        if let Some(message) = self.message {
            envelope.insert("message".into(), json!(message));
        }
        if let Some(meta) = self.meta {
            envelope.insert("meta".into(), meta);
        }

        (self.status_code, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PageParams;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_created_envelope() {
        let response = ApiResponse::created(json!({"id": 1}))
            .with_message("Project created")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["message"], "Project created");
        assert!(body.get("meta").is_none());
    }

    #[tokio::test]
    async fn test_paginated_envelope() {
        let meta = PageParams { page: 1, per_page: 2 }.meta(3);
        let body = body_json(ApiResponse::paginated(vec![1, 2], meta).into_response()).await;
        assert_eq!(body["meta"]["total_pages"], 2);
        assert_eq!(body["meta"]["has_next"], true);
    }

    #[tokio::test]
    async fn test_no_content_is_empty() {
        let response = ApiResponse::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
