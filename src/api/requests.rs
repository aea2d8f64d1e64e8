// Request bodies accepted by the HTTP API, validated with `validator`
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::database::repositories::{IssueFilter, ProjectFilter};
use crate::error::ApiError;
use crate::types::{GlobalRole, IssuePriority, IssueStatus, ProjectRole};

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset"))
    }
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength"))
    }
}

/// `#RRGGBB`
fn validate_color(color: &str) -> Result<(), ValidationError> {
    match color.strip_prefix('#') {
        Some(hex) if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) => Ok(()),
        _ => Err(ValidationError::new("color_format")),
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    #[validate(custom(
        function = "validate_username",
        message = "Username may only contain letters, digits, underscores and hyphens"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 120, message = "Email must be at most 120 characters"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    #[validate(custom(
        function = "validate_password_strength",
        message = "Password must contain an uppercase letter, a lowercase letter and a digit"
    ))]
    pub password: String,

    #[serde(default)]
    pub role: Option<GlobalRole>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    #[validate(custom(
        function = "validate_password_strength",
        message = "Password must contain an uppercase letter, a lowercase letter and a digit"
    ))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Name cannot be blank"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Name cannot be blank"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(range(min = 1, message = "Invalid user id"))]
    pub user_id: i64,

    #[serde(default)]
    pub role: Option<ProjectRole>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIssueRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Title cannot be blank"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIssueRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Title cannot be blank"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignRequest {
    #[validate(range(min = 1, message = "Invalid user id"))]
    pub user_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddLabelRequest {
    #[validate(range(min = 1, message = "Invalid label id"))]
    pub label_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLabelRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Name cannot be blank"))]
    pub name: String,

    #[validate(custom(function = "validate_color", message = "Color must be a hex code like #RRGGBB"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLabelRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Name cannot be blank"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_color", message = "Color must be a hex code like #RRGGBB"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Content cannot be blank"))]
    pub content: String,
}

/// Query string for `GET /projects`
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub owner_id: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<String>,
}

/// Query string for `GET /projects/:id/issues`
#[derive(Debug, Default, Deserialize)]
pub struct IssueListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub reporter_id: Option<String>,
    pub assignee_id: Option<String>,
    pub search: Option<String>,
}

/// Malformed numeric filters are ignored rather than rejected
fn lenient_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Unknown enum values are a client error, reported per field
fn enum_filter<T: std::str::FromStr<Err = String>>(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|message| ApiError::invalid_field(field, message)),
    }
}

impl ProjectListQuery {
    pub fn into_filter(self) -> ProjectFilter {
        ProjectFilter {
            visible_to: None,
            owner_id: lenient_id(self.owner_id.as_deref()),
            search: non_empty(self.search),
            is_active: self
                .is_active
                .as_deref()
                .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Some(true),
                    "false" | "0" => Some(false),
                    _ => None,
                }),
        }
    }
}

impl IssueListQuery {
    pub fn into_filter(self) -> Result<IssueFilter, ApiError> {
        Ok(IssueFilter {
            project_id: None,
            status: enum_filter("status", self.status.as_deref())?,
            priority: enum_filter("priority", self.priority.as_deref())?,
            reporter_id: lenient_id(self.reporter_id.as_deref()),
            assignee_id: lenient_id(self.assignee_id.as_deref()),
            search: non_empty(self.search),
        })
    }
}
