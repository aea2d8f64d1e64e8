use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::AuthError;
use crate::config::SecurityConfig;
use crate::types::GlobalRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub username: String,
    pub role: GlobalRole,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        role: GlobalRole,
        token_type: TokenType,
        security: &SecurityConfig,
    ) -> Self {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => security.access_token_expires_secs,
            TokenType::Refresh => security.refresh_token_expires_secs,
        };

        Self {
            sub: user_id,
            username: username.into(),
            role,
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(lifetime)).timestamp(),
        }
    }
}

/// Access and refresh token issued together on login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl TokenPair {
    pub fn issue(
        user_id: i64,
        username: &str,
        role: GlobalRole,
        security: &SecurityConfig,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            access_token: issue_token(
                Claims::new(user_id, username, role, TokenType::Access, security),
                security,
            )?,
            refresh_token: issue_token(
                Claims::new(user_id, username, role, TokenType::Refresh, security),
                security,
            )?,
            token_type: "Bearer",
            expires_in: security.access_token_expires_secs,
        })
    }
}

pub fn issue_token(claims: Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, then check the token is of the expected kind.
pub fn decode_token(
    token: &str,
    expected: TokenType,
    security: &SecurityConfig,
) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let claims = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(e.to_string()),
        })?
        .claims;

    if claims.token_type != expected {
        return Err(AuthError::WrongTokenType { expected });
    }
    Ok(claims)
}
