//! Rewrites error responses that did not come from `ApiError` (path
//! rejections, 405s from method routing, 413s from the body limit layer)
//! into the same JSON envelope handlers produce.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Plain-text rejection bodies are short; anything longer is not worth echoing
const MAX_DETAIL_BYTES: usize = 4 * 1024;

pub async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let detail = match to_bytes(body, MAX_DETAIL_BYTES).await {
        Ok(bytes) if is_text(parts.headers.get(header::CONTENT_TYPE)) => {
            String::from_utf8_lossy(&bytes).into_owned()
        }
        _ => String::new(),
    };

    tracing::debug!(status = status.as_u16(), detail = %detail, "Wrapping bare error response");
    let mut wrapped = ApiError::from_status(status, &detail).into_response();

    // Keep Allow, Retry-After, CORS and the like
    for (name, value) in parts.headers.iter() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        wrapped.headers_mut().entry(name).or_insert_with(|| value.clone());
    }
    wrapped
}

fn is_json(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn is_text(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/plain"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_plain_text_rejection_wrapped() {
        let response = (StatusCode::BAD_REQUEST, "Invalid URL: Cannot parse `abc`").into_response();
        let wrapped = json_error_body(response).await;
        assert_eq!(wrapped.status(), StatusCode::BAD_REQUEST);

        let body = body_json(wrapped).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "Invalid URL: Cannot parse `abc`");
    }

    #[tokio::test]
    async fn test_empty_405_keeps_allow_header() {
        let response = Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(header::ALLOW, "GET,HEAD,POST")
            .body(Body::empty())
            .unwrap();
        let wrapped = json_error_body(response).await;
        assert_eq!(wrapped.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(wrapped.headers()[header::ALLOW], "GET,HEAD,POST");
        assert_eq!(body_json(wrapped).await["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_json_and_success_untouched() {
        let api = ApiError::conflict("Label already added to issue").into_response();
        let passed = json_error_body(api).await;
        assert_eq!(body_json(passed).await["error"]["message"], "Label already added to issue");

        let ok = (StatusCode::OK, "pong").into_response();
        let passed = json_error_body(ok).await;
        let bytes = to_bytes(passed.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"pong");
    }
}
