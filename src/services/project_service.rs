use sqlx::PgPool;
use tracing::{info, warn};

use super::{Actor, LoadedProject, ServiceError, ServiceResult};
use crate::database::models::{MemberDetail, Project, ProjectMember, User};
use crate::database::repositories::{ProjectChanges, ProjectFilter, ProjectRepository, UserRepository};
use crate::types::ProjectRole;

/// A project with its owner resolved
#[derive(Debug, Clone)]
pub struct ProjectDetail {
    pub project: Project,
    pub owner: Option<User>,
}

pub struct ProjectService {
    projects: ProjectRepository,
    users: UserRepository,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> ServiceResult<Self> {
        Ok(Self {
            projects: ProjectRepository::new(pool.clone())?,
            users: UserRepository::new(pool)?,
        })
    }

    pub async fn create(
        &self,
        actor: Actor,
        name: &str,
        description: Option<&str>,
    ) -> ServiceResult<ProjectDetail> {
        let project = self.projects.create_with_owner(name, description, actor.id).await?;
        info!(project_id = project.id, owner_id = actor.id, "Project created");
        self.detail(project).await
    }

    pub async fn get(&self, actor: Actor, project_id: i64) -> ServiceResult<ProjectDetail> {
        let loaded = LoadedProject::load_viewable(&self.projects, project_id, actor).await?;
        self.detail(loaded.project).await
    }

    /// Global admins see every project; everyone else sees the ones they belong to
    pub async fn list(
        &self,
        actor: Actor,
        mut filter: ProjectFilter,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Project>, i64)> {
        if !actor.is_admin() {
            filter.visible_to = Some(actor.id);
        }
        Ok(self.projects.list(&filter, limit, offset).await?)
    }

    pub async fn update(
        &self,
        actor: Actor,
        project_id: i64,
        changes: ProjectChanges,
    ) -> ServiceResult<ProjectDetail> {
        let loaded = LoadedProject::load(&self.projects, project_id, actor).await?;
        if !loaded.access(actor).can_modify_project() {
            warn!(user_id = actor.id, project_id, "Project update denied");
            return Err(ServiceError::Forbidden("Not authorized to update this project".to_string()));
        }

        let project = self.projects.update(project_id, changes).await?;
        info!(project_id, user_id = actor.id, "Project updated");
        self.detail(project).await
    }

    pub async fn delete(&self, actor: Actor, project_id: i64) -> ServiceResult<()> {
        let loaded = LoadedProject::load(&self.projects, project_id, actor).await?;
        if !loaded.access(actor).can_delete_project() {
            warn!(user_id = actor.id, project_id, "Project delete denied");
            return Err(ServiceError::Forbidden(
                "Only project owner or admin can delete".to_string(),
            ));
        }

        self.projects.delete(project_id).await?;
        info!(project_id, user_id = actor.id, "Project deleted");
        Ok(())
    }

    pub async fn members(&self, actor: Actor, project_id: i64) -> ServiceResult<Vec<MemberDetail>> {
        LoadedProject::load_viewable(&self.projects, project_id, actor).await?;
        Ok(self.projects.members(project_id).await?)
    }

    pub async fn add_member(
        &self,
        actor: Actor,
        project_id: i64,
        user_id: i64,
        role: ProjectRole,
    ) -> ServiceResult<ProjectMember> {
        let loaded = LoadedProject::load(&self.projects, project_id, actor).await?;
        if !loaded.access(actor).can_modify_project() {
            warn!(user_id = actor.id, project_id, "Member add denied");
            return Err(ServiceError::Forbidden("Not authorized to add members".to_string()));
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        if loaded.project.owner_id == user_id
            || self.projects.membership(project_id, user_id).await?.is_some()
        {
            return Err(ServiceError::Conflict("User is already a member".to_string()));
        }

        let member = self.projects.add_member(project_id, user_id, role).await?;
        info!(project_id, member_id = user_id, role = %role, "Project member added");
        Ok(member)
    }

    pub async fn remove_member(&self, actor: Actor, project_id: i64, user_id: i64) -> ServiceResult<()> {
        let loaded = LoadedProject::load(&self.projects, project_id, actor).await?;
        if loaded.project.owner_id == user_id {
            return Err(ServiceError::Forbidden("Cannot remove project owner".to_string()));
        }
        if !loaded.access(actor).can_modify_project() {
            warn!(user_id = actor.id, project_id, "Member removal denied");
            return Err(ServiceError::Forbidden("Not authorized to remove members".to_string()));
        }
        if !self.projects.remove_member(project_id, user_id).await? {
            return Err(ServiceError::NotFound("Member not found".to_string()));
        }

        info!(project_id, member_id = user_id, "Project member removed");
        Ok(())
    }

    async fn detail(&self, project: Project) -> ServiceResult<ProjectDetail> {
        let owner = self.users.find_by_id(project.owner_id).await?;
        Ok(ProjectDetail { project, owner })
    }
}
