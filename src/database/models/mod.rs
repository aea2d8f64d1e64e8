pub mod comment;
pub mod issue;
pub mod label;
pub mod membership;
pub mod project;
pub mod user;

pub use comment::Comment;
pub use issue::Issue;
pub use label::Label;
pub use membership::{Assignment, MemberDetail, ProjectMember};
pub use project::Project;
pub use user::User;
