use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Assignment, Issue, Label, User};
use crate::database::query_builder::Bind;
use crate::database::repository::Repository;
use crate::types::{IssuePriority, IssueStatus};

pub struct NewIssue<'a> {
    pub project_id: i64,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub reporter_id: i64,
}

#[derive(Debug, Default, Clone)]
pub struct IssueChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
}

#[derive(Debug, Default, Clone)]
pub struct IssueFilter {
    pub project_id: Option<i64>,
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
    pub reporter_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub search: Option<String>,
}

pub struct IssueRepository {
    base: Repository<Issue>,
}

impl IssueRepository {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            base: Repository::new("issues", pool)?,
        })
    }

    fn pool(&self) -> &PgPool {
        self.base.pool()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Issue>, DatabaseError> {
        self.base.select_one(id).await
    }

    pub async fn create(&self, new_issue: NewIssue<'_>) -> Result<Issue, DatabaseError> {
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (project_id, title, description, status, priority, reporter_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new_issue.project_id)
        .bind(new_issue.title)
        .bind(new_issue.description)
        .bind(new_issue.status.as_str())
        .bind(new_issue.priority.as_str())
        .bind(new_issue.reporter_id)
        .fetch_one(self.pool())
        .await?;
        Ok(issue)
    }

    pub async fn update(&self, id: i64, changes: IssueChanges) -> Result<Issue, DatabaseError> {
        sqlx::query_as::<_, Issue>(
            r#"
            UPDATE issues SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.priority.map(|p| p.as_str()))
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("issues {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.base.delete(id).await
    }

    /// Newest first
    pub async fn list(
        &self,
        filter: &IssueFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Issue>, i64), DatabaseError> {
        let mut query = self
            .base
            .query()?
            .order_by("created_at DESC, id DESC");

        if let Some(project_id) = filter.project_id {
            query = query.where_eq("project_id", Bind::Int(project_id));
        }
        if let Some(status) = filter.status {
            query = query.where_eq("status", Bind::Text(status.as_str().to_string()));
        }
        if let Some(priority) = filter.priority {
            query = query.where_eq("priority", Bind::Text(priority.as_str().to_string()));
        }
        if let Some(reporter_id) = filter.reporter_id {
            query = query.where_eq("reporter_id", Bind::Int(reporter_id));
        }
        if let Some(assignee_id) = filter.assignee_id {
            query = query.where_bind(
                "EXISTS (SELECT 1 FROM assignments a WHERE a.issue_id = issues.id AND a.user_id = ",
                Bind::Int(assignee_id),
                ")",
            );
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.where_search(&["title", "description"], search.trim());
        }

        query.fetch_page(self.pool(), limit, offset).await
    }

    pub async fn is_assigned(&self, issue_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM assignments WHERE issue_id = $1 AND user_id = $2)",
        )
        .bind(issue_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(exists)
    }

    pub async fn assign(&self, issue_id: i64, user_id: i64) -> Result<Assignment, DatabaseError> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "INSERT INTO assignments (issue_id, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(issue_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(assignment)
    }

    pub async fn unassign(&self, issue_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM assignments WHERE issue_id = $1 AND user_id = $2")
            .bind(issue_id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn assignees(&self, issue_id: i64) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN assignments a ON a.user_id = u.id
            WHERE a.issue_id = $1
            ORDER BY a.assigned_at ASC, a.id ASC
            "#,
        )
        .bind(issue_id)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    pub async fn has_label(&self, issue_id: i64, label_id: i64) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM issue_labels WHERE issue_id = $1 AND label_id = $2)",
        )
        .bind(issue_id)
        .bind(label_id)
        .fetch_one(self.pool())
        .await?;
        Ok(exists)
    }

    pub async fn add_label(&self, issue_id: i64, label_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO issue_labels (issue_id, label_id) VALUES ($1, $2)")
            .bind(issue_id)
            .bind(label_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn remove_label(&self, issue_id: i64, label_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM issue_labels WHERE issue_id = $1 AND label_id = $2")
            .bind(issue_id)
            .bind(label_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn labels(&self, issue_id: i64) -> Result<Vec<Label>, DatabaseError> {
        let labels = sqlx::query_as::<_, Label>(
            r#"
            SELECT l.* FROM labels l
            JOIN issue_labels il ON il.label_id = l.id
            WHERE il.issue_id = $1
            ORDER BY l.name ASC
            "#,
        )
        .bind(issue_id)
        .fetch_all(self.pool())
        .await?;
        Ok(labels)
    }

    pub async fn comment_count(&self, issue_id: i64) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
