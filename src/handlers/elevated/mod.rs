// handlers/elevated/mod.rs - Global admin handlers
//
// Mounted behind jwt_auth_middleware, validate_user_middleware and require_admin.
pub mod labels;
