use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Label;
use crate::database::repository::Repository;

pub struct LabelRepository {
    base: Repository<Label>,
}

impl LabelRepository {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            base: Repository::new("labels", pool)?,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Label>, DatabaseError> {
        self.base.select_one(id).await
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DatabaseError> {
        self.base.exists(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Label>, DatabaseError> {
        let label = sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE name = $1")
            .bind(name)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(label)
    }

    /// Labels are a small global vocabulary, listed whole in name order
    pub async fn list(&self) -> Result<Vec<Label>, DatabaseError> {
        let labels = sqlx::query_as::<_, Label>("SELECT * FROM labels ORDER BY name ASC")
            .fetch_all(self.base.pool())
            .await?;
        Ok(labels)
    }

    pub async fn create(&self, name: &str, color: &str) -> Result<Label, DatabaseError> {
        let label = sqlx::query_as::<_, Label>(
            "INSERT INTO labels (name, color) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(color)
        .fetch_one(self.base.pool())
        .await?;
        Ok(label)
    }

    pub async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Label, DatabaseError> {
        sqlx::query_as::<_, Label>(
            r#"
            UPDATE labels SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .fetch_optional(self.base.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("labels {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.base.delete(id).await
    }
}
