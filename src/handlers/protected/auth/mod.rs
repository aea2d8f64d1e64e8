// handlers/protected/auth/mod.rs - Account endpoints for the signed-in user
pub mod password;
pub mod session;

pub use password::password_put;
pub use session::{logout_post, me_get};
