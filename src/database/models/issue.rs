use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{IssuePriority, IssueStatus};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Issue {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    #[sqlx(try_from = "String")]
    pub priority: IssuePriority,
    /// NULL once the reporting user has been deleted
    pub reporter_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
