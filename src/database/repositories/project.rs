use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{MemberDetail, Project, ProjectMember};
use crate::database::query_builder::Bind;
use crate::database::repository::Repository;
use crate::types::ProjectRole;

#[derive(Debug, Default, Clone)]
pub struct ProjectFilter {
    /// Restrict to projects this user owns or belongs to
    pub visible_to: Option<i64>,
    pub owner_id: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub struct ProjectRepository {
    base: Repository<Project>,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            base: Repository::new("projects", pool)?,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Project>, DatabaseError> {
        self.base.select_one(id).await
    }

    /// Insert the project and its owner membership in one transaction
    pub async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: i64,
    ) -> Result<Project, DatabaseError> {
        let mut tx = self.base.pool().begin().await?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, description, owner_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(project.id)
            .bind(owner_id)
            .bind(ProjectRole::Owner.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    pub async fn update(&self, id: i64, changes: ProjectChanges) -> Result<Project, DatabaseError> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.is_active)
        .fetch_optional(self.base.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("projects {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.base.delete(id).await
    }

    /// Newest first
    pub async fn list(
        &self,
        filter: &ProjectFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Project>, i64), DatabaseError> {
        let mut query = self.base.query()?.order_by("created_at DESC, id DESC");

        if let Some(user_id) = filter.visible_to {
            query = query.where_bind(
                "EXISTS (SELECT 1 FROM (SELECT projects.owner_id AS user_id \
                 UNION ALL SELECT m.user_id FROM project_members m WHERE m.project_id = projects.id) v \
                 WHERE v.user_id = ",
                Bind::Int(user_id),
                ")",
            );
        }
        if let Some(owner_id) = filter.owner_id {
            query = query.where_eq("owner_id", Bind::Int(owner_id));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.where_search(&["name"], search.trim());
        }
        if let Some(is_active) = filter.is_active {
            query = query.where_eq("is_active", Bind::Bool(is_active));
        }

        query.fetch_page(self.base.pool(), limit, offset).await
    }

    pub async fn membership(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<ProjectMember>, DatabaseError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            "SELECT * FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(self.base.pool())
        .await?;
        Ok(member)
    }

    pub async fn members(&self, project_id: i64) -> Result<Vec<MemberDetail>, DatabaseError> {
        let members = sqlx::query_as::<_, MemberDetail>(
            r#"
            SELECT m.user_id, u.username, u.role AS global_role, m.role, m.joined_at
            FROM project_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.joined_at ASC, m.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.base.pool())
        .await?;
        Ok(members)
    }

    pub async fn add_member(
        &self,
        project_id: i64,
        user_id: i64,
        role: ProjectRole,
    ) -> Result<ProjectMember, DatabaseError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            "INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(self.base.pool())
        .await?;
        Ok(member)
    }

    pub async fn remove_member(&self, project_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(self.base.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
