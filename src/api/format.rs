// Wire format for entities returned by the API
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::TokenPair;
use crate::database::models::{Issue, Label, Project, User};
use crate::services::{CommentWithAuthor, IssueDetail, ProjectDetail};
use crate::types::{GlobalRole, IssuePriority, IssueStatus};

/// Public view of a user. Email is only present on the caller's own profile.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: GlobalRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    pub fn public(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: None,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }

    pub fn own_profile(user: &User) -> Self {
        Self {
            email: Some(user.email.clone()),
            ..Self::public(user)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserView>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            owner: None,
            is_active: project.is_active,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

impl From<ProjectDetail> for ProjectView {
    fn from(detail: ProjectDetail) -> Self {
        let owner = detail.owner.as_ref().map(UserView::public);
        Self {
            owner,
            ..Self::from(detail.project)
        }
    }
}

/// Issue row as it appears in list responses
#[derive(Debug, Clone, Serialize)]
pub struct IssueView {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub reporter_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Issue> for IssueView {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            project_id: issue.project_id,
            title: issue.title,
            description: issue.description,
            status: issue.status,
            priority: issue.priority,
            reporter_id: issue.reporter_id,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Single-issue responses carry their relations
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetailView {
    #[serde(flatten)]
    pub issue: IssueView,
    pub reporter: Option<UserView>,
    pub assignees: Vec<UserView>,
    pub labels: Vec<Label>,
    pub comment_count: i64,
}

impl From<IssueDetail> for IssueDetailView {
    fn from(detail: IssueDetail) -> Self {
        Self {
            reporter: detail.reporter.as_ref().map(UserView::public),
            assignees: detail.assignees.iter().map(UserView::public).collect(),
            labels: detail.labels,
            comment_count: detail.comment_count,
            issue: detail.issue.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub issue_id: i64,
    pub author_id: Option<i64>,
    pub author: Option<UserView>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(value: CommentWithAuthor) -> Self {
        let CommentWithAuthor { comment, author } = value;
        Self {
            id: comment.id,
            issue_id: comment.issue_id,
            author_id: comment.author_id,
            author: author.as_ref().map(UserView::public),
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// Body of a successful login
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "token_type": "Bearer",
///   "expires_in": 900,
///   "user": { "id": 1, "username": "jane", "email": "jane@example.com", ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LoginView {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserView,
}

impl LoginView {
    pub fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            tokens,
            user: UserView::own_profile(user),
        }
    }
}
