// handlers/protected/issues/mod.rs - Issues, assignments and issue labels
pub mod assignments;
pub mod issue;
pub mod labels;

pub use assignments::{assign_delete, assign_post};
pub use issue::{issue_create, issue_delete, issue_get, issue_list, issue_update};
pub use labels::{label_add, label_remove};
