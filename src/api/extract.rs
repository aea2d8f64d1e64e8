use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, FieldErrors};

/// JSON body that has been deserialized and passed `Validate`.
///
/// Malformed JSON is a 400; well-formed JSON with the wrong shape or
/// failing field rules is a 422 with per-field messages.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let mut field_errors = FieldErrors::new();
            field_errors.insert("body".to_string(), vec![err.body_text()]);
            ApiError::validation(field_errors)
        }
        JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Malformed JSON body"),
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/json`")
        }
        // Body limit hit while buffering (no Content-Length to reject up front)
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::payload_too_large("Request body too large")
        }
        other => ApiError::bad_request(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 3, message = "Too short"))]
        name: String,
    }

    fn request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(named) = ValidatedJson::<Named>::from_request(request(r#"{"name":"abcd"}"#), &())
            .await
            .unwrap();
        assert_eq!(named.name, "abcd");
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let err = ValidatedJson::<Named>::from_request(request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_validation_error() {
        let err = ValidatedJson::<Named>::from_request(request(r#"{"name": 5}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        use axum::{extract::DefaultBodyLimit, response::IntoResponse, routing::post, Router};
        use tower::ServiceExt;

        async fn accept(ValidatedJson(named): ValidatedJson<Named>) -> String {
            named.name
        }

        let app = Router::new()
            .route("/", post(accept))
            .layer(DefaultBodyLimit::max(1024));
        let body = format!(r#"{{"name":"{}"}}"#, "x".repeat(4096));
        let response = app.oneshot(request(&body)).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_rule_failure_lists_field() {
        let err = ValidatedJson::<Named>::from_request(request(r#"{"name":"ab"}"#), &())
            .await
            .unwrap_err();
        let body = err.to_json();
        assert_eq!(body["error"]["details"]["validation_errors"]["name"][0], "Too short");
    }
}
