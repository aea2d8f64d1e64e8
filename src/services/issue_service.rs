use sqlx::PgPool;
use tracing::{info, warn};

use super::{Actor, LoadedProject, ServiceError, ServiceResult};
use crate::database::models::{Assignment, Issue, Label, User};
use crate::database::repositories::{
    IssueChanges, IssueFilter, IssueRepository, LabelRepository, NewIssue, ProjectRepository,
    UserRepository,
};
use crate::types::{IssuePriority, IssueStatus};

/// An issue with reporter, assignees, labels and comment count
#[derive(Debug, Clone)]
pub struct IssueDetail {
    pub issue: Issue,
    pub reporter: Option<User>,
    pub assignees: Vec<User>,
    pub labels: Vec<Label>,
    pub comment_count: i64,
}

pub struct IssueService {
    issues: IssueRepository,
    projects: ProjectRepository,
    labels: LabelRepository,
    users: UserRepository,
}

/// An issue loaded together with the actor's standing in its project
struct LoadedIssue {
    issue: Issue,
    project: LoadedProject,
}

impl IssueService {
    pub fn new(pool: PgPool) -> ServiceResult<Self> {
        Ok(Self {
            issues: IssueRepository::new(pool.clone())?,
            projects: ProjectRepository::new(pool.clone())?,
            labels: LabelRepository::new(pool.clone())?,
            users: UserRepository::new(pool)?,
        })
    }

    async fn load(&self, actor: Actor, issue_id: i64) -> ServiceResult<LoadedIssue> {
        let issue = self
            .issues
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Issue not found".to_string()))?;
        let project = LoadedProject::load_viewable(&self.projects, issue.project_id, actor).await?;
        Ok(LoadedIssue { issue, project })
    }

    /// Load an issue and require modify rights on it
    async fn load_modifiable(
        &self,
        actor: Actor,
        issue_id: i64,
        denied: &str,
    ) -> ServiceResult<LoadedIssue> {
        let loaded = self.load(actor, issue_id).await?;
        let is_assignee = self.issues.is_assigned(issue_id, actor.id).await?;
        if !loaded.project.access(actor).can_modify_issue(&loaded.issue, is_assignee) {
            warn!(user_id = actor.id, issue_id, "Issue modification denied");
            return Err(ServiceError::Forbidden(denied.to_string()));
        }
        Ok(loaded)
    }

    pub async fn create(
        &self,
        actor: Actor,
        project_id: i64,
        title: &str,
        description: Option<&str>,
        status: Option<IssueStatus>,
        priority: Option<IssuePriority>,
    ) -> ServiceResult<IssueDetail> {
        let project = LoadedProject::load(&self.projects, project_id, actor).await?;
        if !project.access(actor).can_contribute() {
            warn!(user_id = actor.id, project_id, "Issue creation denied");
            return Err(ServiceError::Forbidden(
                "User is not a member of this project".to_string(),
            ));
        }

        let issue = self
            .issues
            .create(NewIssue {
                project_id,
                title,
                description,
                status: status.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                reporter_id: actor.id,
            })
            .await?;

        info!(issue_id = issue.id, project_id, reporter_id = actor.id, "Issue created");
        self.detail(issue).await
    }

    pub async fn list(
        &self,
        actor: Actor,
        project_id: i64,
        mut filter: IssueFilter,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Issue>, i64)> {
        LoadedProject::load_viewable(&self.projects, project_id, actor).await?;
        filter.project_id = Some(project_id);
        Ok(self.issues.list(&filter, limit, offset).await?)
    }

    pub async fn get(&self, actor: Actor, issue_id: i64) -> ServiceResult<IssueDetail> {
        let loaded = self.load(actor, issue_id).await?;
        self.detail(loaded.issue).await
    }

    pub async fn update(
        &self,
        actor: Actor,
        issue_id: i64,
        changes: IssueChanges,
    ) -> ServiceResult<IssueDetail> {
        self.load_modifiable(actor, issue_id, "Not authorized to update this issue").await?;
        let issue = self.issues.update(issue_id, changes).await?;
        info!(issue_id, user_id = actor.id, "Issue updated");
        self.detail(issue).await
    }

    pub async fn delete(&self, actor: Actor, issue_id: i64) -> ServiceResult<()> {
        let loaded = self.load(actor, issue_id).await?;
        if !loaded.project.access(actor).can_delete_issue(&loaded.issue) {
            warn!(user_id = actor.id, issue_id, "Issue delete denied");
            return Err(ServiceError::Forbidden("Not authorized to delete this issue".to_string()));
        }

        self.issues.delete(issue_id).await?;
        info!(issue_id, user_id = actor.id, "Issue deleted");
        Ok(())
    }

    pub async fn assign(&self, actor: Actor, issue_id: i64, user_id: i64) -> ServiceResult<Assignment> {
        let loaded = self
            .load_modifiable(actor, issue_id, "Not authorized to assign users")
            .await?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        let project = &loaded.project.project;
        let is_member = project.owner_id == user_id
            || self.projects.membership(project.id, user_id).await?.is_some();
        if !is_member {
            return Err(ServiceError::Forbidden(
                "Assignee is not a member of the project".to_string(),
            ));
        }
        if self.issues.is_assigned(issue_id, user_id).await? {
            return Err(ServiceError::Conflict(
                "User is already assigned to this issue".to_string(),
            ));
        }

        let assignment = self.issues.assign(issue_id, user_id).await?;
        info!(issue_id, assignee_id = user_id, user_id = actor.id, "Issue assigned");
        Ok(assignment)
    }

    pub async fn unassign(&self, actor: Actor, issue_id: i64, user_id: i64) -> ServiceResult<()> {
        self.load_modifiable(actor, issue_id, "Not authorized to unassign users")
            .await?;
        if !self.issues.unassign(issue_id, user_id).await? {
            return Err(ServiceError::NotFound(
                "User is not assigned to this issue".to_string(),
            ));
        }
        info!(issue_id, assignee_id = user_id, user_id = actor.id, "Issue unassigned");
        Ok(())
    }

    pub async fn add_label(&self, actor: Actor, issue_id: i64, label_id: i64) -> ServiceResult<Vec<Label>> {
        self.load_modifiable(actor, issue_id, "Not authorized to add labels")
            .await?;
        if !self.labels.exists(label_id).await? {
            return Err(ServiceError::NotFound("Label not found".to_string()));
        }
        if self.issues.has_label(issue_id, label_id).await? {
            return Err(ServiceError::Conflict("Label already added to issue".to_string()));
        }

        self.issues.add_label(issue_id, label_id).await?;
        info!(issue_id, label_id, user_id = actor.id, "Label added to issue");
        Ok(self.issues.labels(issue_id).await?)
    }

    pub async fn remove_label(&self, actor: Actor, issue_id: i64, label_id: i64) -> ServiceResult<()> {
        self.load_modifiable(actor, issue_id, "Not authorized to remove labels")
            .await?;
        if !self.labels.exists(label_id).await? {
            return Err(ServiceError::NotFound("Label not found".to_string()));
        }
        if !self.issues.remove_label(issue_id, label_id).await? {
            return Err(ServiceError::NotFound("Label is not on this issue".to_string()));
        }
        info!(issue_id, label_id, user_id = actor.id, "Label removed from issue");
        Ok(())
    }

    async fn detail(&self, issue: Issue) -> ServiceResult<IssueDetail> {
        let reporter = match issue.reporter_id {
            Some(id) => self.users.find_by_id(id).await?,
            None => None,
        };
        let assignees = self.issues.assignees(issue.id).await?;
        let labels = self.issues.labels(issue.id).await?;
        let comment_count = self.issues.comment_count(issue.id).await?;

        Ok(IssueDetail {
            issue,
            reporter,
            assignees,
            labels,
            comment_count,
        })
    }
}
