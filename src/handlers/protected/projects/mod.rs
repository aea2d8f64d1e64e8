// handlers/protected/projects/mod.rs - /projects and /projects/:project_id/members
pub mod members;
pub mod project;

pub use members::{member_add, member_list, member_remove};
pub use project::{project_create, project_delete, project_get, project_list, project_update};
