use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, warn};

use super::{Actor, LoadedProject, ServiceError, ServiceResult};
use crate::database::models::{Comment, Issue, User};
use crate::database::repositories::{CommentRepository, IssueRepository, ProjectRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: Option<User>,
}

pub struct CommentService {
    comments: CommentRepository,
    issues: IssueRepository,
    projects: ProjectRepository,
    users: UserRepository,
}

impl CommentService {
    pub fn new(pool: PgPool) -> ServiceResult<Self> {
        Ok(Self {
            comments: CommentRepository::new(pool.clone())?,
            issues: IssueRepository::new(pool.clone())?,
            projects: ProjectRepository::new(pool.clone())?,
            users: UserRepository::new(pool)?,
        })
    }

    async fn issue(&self, issue_id: i64) -> ServiceResult<Issue> {
        self.issues
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Issue not found".to_string()))
    }

    /// Oldest first
    pub async fn list(
        &self,
        actor: Actor,
        issue_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<CommentWithAuthor>, i64)> {
        let issue = self.issue(issue_id).await?;
        LoadedProject::load_viewable(&self.projects, issue.project_id, actor).await?;

        let (comments, total) = self.comments.list_for_issue(issue_id, limit, offset).await?;
        Ok((self.with_authors(comments).await?, total))
    }

    pub async fn create(&self, actor: Actor, issue_id: i64, content: &str) -> ServiceResult<CommentWithAuthor> {
        let issue = self.issue(issue_id).await?;
        let project = LoadedProject::load(&self.projects, issue.project_id, actor).await?;
        if !project.access(actor).can_contribute() {
            warn!(user_id = actor.id, issue_id, "Comment creation denied");
            return Err(ServiceError::Forbidden(
                "User is not a member of the project".to_string(),
            ));
        }

        let comment = self.comments.create(issue_id, actor.id, content).await?;
        info!(comment_id = comment.id, issue_id, author_id = actor.id, "Comment created");
        self.single(comment).await
    }

    pub async fn update(&self, actor: Actor, comment_id: i64, content: &str) -> ServiceResult<CommentWithAuthor> {
        self.load_modifiable(actor, comment_id, "Not authorized to update this comment")
            .await?;
        let comment = self.comments.update(comment_id, content).await?;
        info!(comment_id, user_id = actor.id, "Comment updated");
        self.single(comment).await
    }

    pub async fn delete(&self, actor: Actor, comment_id: i64) -> ServiceResult<()> {
        self.load_modifiable(actor, comment_id, "Not authorized to delete this comment")
            .await?;
        self.comments.delete(comment_id).await?;
        info!(comment_id, user_id = actor.id, "Comment deleted");
        Ok(())
    }

    async fn load_modifiable(&self, actor: Actor, comment_id: i64, denied: &str) -> ServiceResult<Comment> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Comment not found".to_string()))?;
        let issue = self.issue(comment.issue_id).await?;
        let project = LoadedProject::load(&self.projects, issue.project_id, actor).await?;

        if !project.access(actor).can_modify_comment(&comment) {
            warn!(user_id = actor.id, comment_id, "Comment modification denied");
            return Err(ServiceError::Forbidden(denied.to_string()));
        }
        Ok(comment)
    }

    async fn single(&self, comment: Comment) -> ServiceResult<CommentWithAuthor> {
        let author = match comment.author_id {
            Some(id) => self.users.find_by_id(id).await?,
            None => None,
        };
        Ok(CommentWithAuthor { comment, author })
    }

    async fn with_authors(&self, comments: Vec<Comment>) -> ServiceResult<Vec<CommentWithAuthor>> {
        let mut author_ids: Vec<i64> = comments.iter().filter_map(|c| c.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i64, User> = self
            .users
            .find_many(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = comment.author_id.and_then(|id| authors.get(&id).cloned());
                CommentWithAuthor { comment, author }
            })
            .collect())
    }
}
