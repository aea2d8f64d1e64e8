use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{GlobalRole, ProjectRole};

/// Row of project_members
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

/// Row of assignments
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub issue_id: i64,
    pub user_id: i64,
    pub assigned_at: DateTime<Utc>,
}

/// Membership joined with the public fields of its user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberDetail {
    pub user_id: i64,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub global_role: GlobalRole,
    #[sqlx(try_from = "String")]
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}
