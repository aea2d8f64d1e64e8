use sqlx::PgPool;
use tracing::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::auth::{self, Claims, TokenPair, TokenType};
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::repositories::{NewUser, UserRepository};
use crate::types::GlobalRole;

/// Validated input for account creation
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: GlobalRole,
}

pub struct AuthService {
    users: UserRepository,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, security: &SecurityConfig) -> ServiceResult<Self> {
        Ok(Self {
            users: UserRepository::new(pool)?,
            security: security.clone(),
        })
    }

    /// Self-service sign-up. The admin role is only granted when the
    /// deployment allows it; otherwise admins come from `create_admin`.
    pub async fn register(&self, registration: Registration) -> ServiceResult<User> {
        if registration.role == GlobalRole::Admin && !self.security.allow_admin_registration {
            warn!(username = %registration.username, "Rejected self-registration as admin");
            return Err(ServiceError::Forbidden(
                "Registering with the admin role is not allowed".to_string(),
            ));
        }
        self.create_user(registration).await
    }

    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        self.create_user(Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: GlobalRole::Admin,
        })
        .await
    }

    async fn create_user(&self, registration: Registration) -> ServiceResult<User> {
        if self.users.username_exists(&registration.username).await? {
            return Err(ServiceError::Conflict("Username already exists".to_string()));
        }
        if self.users.email_exists(&registration.email).await? {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let password_hash = auth::hash_password(&registration.password)?;
        let user = self
            .users
            .create(NewUser {
                username: &registration.username,
                email: &registration.email,
                password_hash: &password_hash,
                role: registration.role,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<(User, TokenPair)> {
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());

        let user = self.users.find_by_username(username).await?.ok_or_else(invalid)?;
        if !auth::verify_password(password, &user.password_hash) {
            warn!(username, "Failed login attempt");
            return Err(invalid());
        }
        if !user.is_active {
            warn!(user_id = user.id, "Login attempt on disabled account");
            return Err(ServiceError::Unauthorized("Account is disabled".to_string()));
        }

        let tokens = TokenPair::issue(user.id, &user.username, user.role, &self.security)?;
        info!(user_id = user.id, "User logged in");
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<(User, String)> {
        let claims = auth::decode_token(refresh_token, TokenType::Refresh, &self.security)?;
        let user = self.active_user(claims.sub).await?;

        let access = auth::issue_token(
            Claims::new(user.id, &user.username, user.role, TokenType::Access, &self.security),
            &self.security,
        )?;
        info!(user_id = user.id, "Access token refreshed");
        Ok((user, access))
    }

    pub async fn current_user(&self, user_id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = self.current_user(user_id).await?;
        if !auth::verify_password(current_password, &user.password_hash) {
            return Err(ServiceError::BadRequest("Current password is incorrect".to_string()));
        }
        if current_password == new_password {
            return Err(ServiceError::BadRequest(
                "New password must differ from the current password".to_string(),
            ));
        }

        let password_hash = auth::hash_password(new_password)?;
        self.users.update_password(user.id, &password_hash).await?;
        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    async fn active_user(&self, user_id: i64) -> ServiceResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))?;
        if !user.is_active {
            return Err(ServiceError::Unauthorized("Account is disabled".to_string()));
        }
        Ok(user)
    }
}
