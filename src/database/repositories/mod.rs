pub mod comment;
pub mod issue;
pub mod label;
pub mod project;
pub mod user;

pub use comment::CommentRepository;
pub use issue::{IssueChanges, IssueFilter, IssueRepository, NewIssue};
pub use label::LabelRepository;
pub use project::{ProjectChanges, ProjectFilter, ProjectRepository};
pub use user::{NewUser, UserRepository};
