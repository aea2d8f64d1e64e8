// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::services::ServiceError;

/// Per-field validation messages, keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized, with a specific code for token problems
    Unauthorized { message: String, code: &'static str },

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 422 Unprocessable Entity
    Validation { message: String, field_errors: FieldErrors },

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError { message: String, code: &'static str },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::Validation { message, .. } => message,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized { code, .. } => code,
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::TooManyRequests(_) => "RATE_LIMIT_EXCEEDED",
            ApiError::InternalServerError { code, .. } => code,
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut error = json!({
            "message": self.message(),
            "status": self.status_code().as_u16(),
            "code": self.error_code(),
        });

        if let ApiError::Validation { field_errors, .. } = self {
            error["details"] = json!({ "validation_errors": field_errors });
        }

        json!({ "error": error })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            code: "UNAUTHORIZED",
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn validation(field_errors: FieldErrors) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            field_errors,
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), vec![message.into()]);
        Self::validation(field_errors)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            code: "INTERNAL_ERROR",
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Error for a bare status produced outside our handlers (router, extractors,
    /// tower layers). `detail` is the plain-text body they wrote, if any.
    pub fn from_status(status: StatusCode, detail: &str) -> Self {
        let detail = detail.trim();
        let or = |fallback: &str| {
            if detail.is_empty() {
                fallback.to_string()
            } else {
                detail.to_string()
            }
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::unauthorized(or("Authentication required")),
            StatusCode::FORBIDDEN => ApiError::forbidden(or("Access denied")),
            StatusCode::NOT_FOUND => ApiError::not_found("Resource not found"),
            StatusCode::METHOD_NOT_ALLOWED => ApiError::method_not_allowed("Method not allowed"),
            StatusCode::CONFLICT => ApiError::conflict(or("Conflict")),
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("Request body too large"),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::invalid_field("body", or("Unprocessable request")),
            StatusCode::TOO_MANY_REQUESTS => ApiError::too_many_requests(or("Rate limit exceeded")),
            StatusCode::SERVICE_UNAVAILABLE => ApiError::service_unavailable(or("Service unavailable")),
            s if s.is_server_error() => ApiError::internal_server_error("An internal server error occurred"),
            _ => ApiError::bad_request(or("Bad request")),
        }
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return ApiError::conflict("Resource already exists");
        }
        if err.is_connection_error() {
            tracing::error!("Database unavailable: {}", err);
            return ApiError::service_unavailable("Database temporarily unavailable");
        }
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            other => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", other);
                ApiError::InternalServerError {
                    message: "A database error occurred".to_string(),
                    code: "DATABASE_ERROR",
                }
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::Unauthorized {
                message: "Authorization token is missing".to_string(),
                code: "MISSING_TOKEN",
            },
            AuthError::TokenExpired => ApiError::Unauthorized {
                message: "Token has expired".to_string(),
                code: "TOKEN_EXPIRED",
            },
            AuthError::InvalidToken(detail) => {
                tracing::debug!("Rejected token: {}", detail);
                ApiError::Unauthorized {
                    message: "Invalid token".to_string(),
                    code: "INVALID_TOKEN",
                }
            }
            AuthError::WrongTokenType { expected } => ApiError::Unauthorized {
                message: format!("Invalid token: {} token required", expected),
                code: "INVALID_TOKEN",
            },
            other => {
                tracing::error!("Authentication subsystem error: {}", other);
                ApiError::internal_server_error("An internal server error occurred")
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Auth(e) => e.into(),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value ({})", e.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::validation(field_errors)
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenType;

    #[test]
    fn error_envelope_shape() {
        let body = ApiError::not_found("Project not found").to_json();
        assert_eq!(body["error"]["message"], "Project not found");
        assert_eq!(body["error"]["status"], 404);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn validation_errors_carry_details() {
        let err = ApiError::invalid_field("email", "Invalid email format");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = err.to_json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["details"]["validation_errors"]["email"][0],
            "Invalid email format"
        );
    }

    #[test]
    fn token_errors_map_to_specific_codes() {
        assert_eq!(ApiError::from(AuthError::MissingToken).error_code(), "MISSING_TOKEN");
        assert_eq!(ApiError::from(AuthError::TokenExpired).error_code(), "TOKEN_EXPIRED");
        let wrong = ApiError::from(AuthError::WrongTokenType { expected: TokenType::Refresh });
        assert_eq!(wrong.error_code(), "INVALID_TOKEN");
        assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bare_statuses_become_envelopes() {
        let err = ApiError::from_status(StatusCode::METHOD_NOT_ALLOWED, "");
        assert_eq!(err.error_code(), "METHOD_NOT_ALLOWED");
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);

        let err = ApiError::from_status(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded");
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(err.message(), "Request body too large");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "Invalid URL: Cannot parse \"abc\" to a `i64`");
        assert_eq!(err.error_code(), "BAD_REQUEST");
        assert!(err.message().starts_with("Invalid URL"));

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream said no");
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(!err.message().contains("upstream"));
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn database_errors_hide_details() {
        let err = ApiError::from(DatabaseError::QueryError("syntax error at or near".into()));
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(!err.message().contains("syntax"));

        let timeout = ApiError::from(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        assert_eq!(timeout.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
