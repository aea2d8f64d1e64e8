pub mod access;
pub mod auth_service;
pub mod comment_service;
pub mod issue_service;
pub mod label_service;
pub mod project_service;

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::{Project, ProjectMember};
use crate::database::repositories::ProjectRepository;

pub use access::{Actor, ProjectAccess};
pub use auth_service::{AuthService, Registration};
pub use comment_service::{CommentService, CommentWithAuthor};
pub use issue_service::{IssueDetail, IssueService};
pub use label_service::LabelService;
pub use project_service::{ProjectDetail, ProjectService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A project row together with the acting user's membership in it
pub(crate) struct LoadedProject {
    pub project: Project,
    pub membership: Option<ProjectMember>,
}

impl LoadedProject {
    pub async fn load(
        projects: &ProjectRepository,
        project_id: i64,
        actor: Actor,
    ) -> ServiceResult<Self> {
        let project = projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;
        let membership = projects.membership(project_id, actor.id).await?;
        Ok(Self {
            project,
            membership,
        })
    }

    pub fn access(&self, actor: Actor) -> ProjectAccess<'_> {
        ProjectAccess::new(&self.project, self.membership.as_ref(), actor)
    }

    /// Load and require read access in one step
    pub async fn load_viewable(
        projects: &ProjectRepository,
        project_id: i64,
        actor: Actor,
    ) -> ServiceResult<Self> {
        let loaded = Self::load(projects, project_id, actor).await?;
        if !loaded.access(actor).can_view() {
            tracing::warn!(user_id = actor.id, project_id, "Project access denied");
            return Err(ServiceError::Forbidden("Access denied".to_string()));
        }
        Ok(loaded)
    }
}
