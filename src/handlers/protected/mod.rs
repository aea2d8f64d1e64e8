// handlers/protected/mod.rs - Protected handlers (access token required)
//
// Every route here runs behind jwt_auth_middleware and validate_user_middleware,
// so handlers receive the freshly loaded `CurrentUser` as an extension.
pub mod auth;
pub mod comments;
pub mod issues;
pub mod projects;
