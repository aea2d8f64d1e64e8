use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Comment;
use crate::database::query_builder::Bind;
use crate::database::repository::Repository;

pub struct CommentRepository {
    base: Repository<Comment>,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            base: Repository::new("comments", pool)?,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, DatabaseError> {
        self.base.select_one(id).await
    }

    pub async fn create(
        &self,
        issue_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<Comment, DatabaseError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (issue_id, author_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(issue_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(self.base.pool())
        .await?;
        Ok(comment)
    }

    pub async fn update(&self, id: i64, content: &str) -> Result<Comment, DatabaseError> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(self.base.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("comments {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.base.delete(id).await
    }

    /// Oldest first, so a thread reads top to bottom
    pub async fn list_for_issue(
        &self,
        issue_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64), DatabaseError> {
        self.base
            .query()?
            .where_eq("issue_id", Bind::Int(issue_id))
            .order_by("created_at ASC, id ASC")
            .fetch_page(self.base.pool(), limit, offset)
            .await
    }
}
