pub mod auth;
pub mod json_errors;
pub mod rate_limit;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use json_errors::json_error_body;
pub use rate_limit::{rate_limit_middleware, ClientRateLimiter};
pub use response::{ApiResponse, ApiResult};
pub use validate_user::{require_admin, validate_user_middleware, CurrentUser};
