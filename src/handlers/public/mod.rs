// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, health checks, the service index and label reads.
pub mod auth;
pub mod health;
pub mod labels;

pub use health::root;
