use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEV_JWT_SECRET: &str = "dev-jwt-secret-change-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Insecure configuration: {0}")]
    Insecure(&'static str),

    #[error("Invalid rate limit '{0}', expected '<count> per <second|minute|hour>'")]
    InvalidRateLimit(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub app: AppInfo,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    /// Human form, e.g. "100 per minute"
    pub rate_limit: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_request_size_bytes: usize,
    /// Key rate limits on X-Forwarded-For / X-Real-IP instead of the socket peer.
    /// Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_expires_secs: i64,
    pub refresh_token_expires_secs: i64,
    /// "*" means any origin
    pub cors_origins: Vec<String>,
    pub allow_admin_registration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Json,
    Text,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("testing") | Ok("test") => Environment::Testing,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Testing => Self::testing(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // App overrides
        if let Ok(v) = env::var("APP_NAME") {
            self.app.name = v;
        }
        if let Ok(v) = env::var("APP_VERSION") {
            self.app.version = v;
        }

        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_AUTO_MIGRATE") {
            self.database.auto_migrate = v.parse().unwrap_or(self.database.auto_migrate);
        }

        // API overrides
        if let Ok(v) = env::var("RATELIMIT_ENABLED") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("RATELIMIT_DEFAULT") {
            self.api.rate_limit = v;
        }
        if let Ok(v) = env::var("DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }
        if let Ok(v) = env::var("MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("TRUST_PROXY_HEADERS") {
            self.api.trust_proxy_headers = v.parse().unwrap_or(self.api.trust_proxy_headers);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET_KEY").or_else(|_| env::var("SECRET_KEY")) {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_EXPIRES") {
            self.security.access_token_expires_secs =
                v.parse().unwrap_or(self.security.access_token_expires_secs);
        }
        if let Ok(v) = env::var("JWT_REFRESH_TOKEN_EXPIRES") {
            self.security.refresh_token_expires_secs =
                v.parse().unwrap_or(self.security.refresh_token_expires_secs);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = parse_origins(&v);
        }
        if let Ok(v) = env::var("ALLOW_ADMIN_REGISTRATION") {
            self.security.allow_admin_registration =
                v.parse().unwrap_or(self.security.allow_admin_registration);
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v.to_lowercase();
        }
        if let Ok(v) = env::var("LOG_FORMAT") {
            self.logging.format = match v.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Text,
            };
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            app: AppInfo::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                auto_migrate: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit: "1000 per minute".to_string(),
                default_page_size: 20,
                max_page_size: 100,
                max_request_size_bytes: 1024 * 1024, // 1MB
                trust_proxy_headers: false,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                access_token_expires_secs: 15 * 60,
                refresh_token_expires_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["*".to_string()],
                allow_admin_registration: true,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Text,
            },
        }
    }

    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            app: AppInfo::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 5,
                auto_migrate: false,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit: "1000 per minute".to_string(),
                default_page_size: 20,
                max_page_size: 100,
                max_request_size_bytes: 1024 * 1024,
                trust_proxy_headers: false,
            },
            security: SecurityConfig {
                jwt_secret: "test-jwt-secret".to_string(),
                access_token_expires_secs: 5 * 60,
                refresh_token_expires_secs: 60 * 60,
                cors_origins: vec!["*".to_string()],
                allow_admin_registration: true,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: LogFormat::Text,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            app: AppInfo::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                auto_migrate: false,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit: "100 per minute".to_string(),
                default_page_size: 20,
                max_page_size: 100,
                max_request_size_bytes: 1024 * 1024,
                trust_proxy_headers: false,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                access_token_expires_secs: 15 * 60,
                refresh_token_expires_secs: 7 * 24 * 60 * 60,
                cors_origins: vec!["*".to_string()],
                allow_admin_registration: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }

    /// Refuse to start production with development secrets or no database
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_rate_limit(&self.api.rate_limit)?;

        if self.environment != Environment::Production {
            return Ok(());
        }
        if self.security.jwt_secret.is_empty() || self.security.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::Insecure("JWT_SECRET_KEY must be set in production"));
        }
        if self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "Issue Tracker API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse "<count> per <unit>" into a request count and the window it applies to.
pub fn parse_rate_limit(value: &str) -> Result<(u32, Duration), ConfigError> {
    let invalid = || ConfigError::InvalidRateLimit(value.to_string());

    let mut parts = value.split_whitespace();
    let count: u32 = parts.next().and_then(|n| n.parse().ok()).ok_or_else(invalid)?;
    if parts.next() != Some("per") {
        return Err(invalid());
    }
    let window = match parts.next().map(|u| u.trim_end_matches('s')) {
        Some("second") => Duration::from_secs(1),
        Some("minute") => Duration::from_secs(60),
        Some("hour") => Duration::from_secs(60 * 60),
        Some("day") => Duration::from_secs(24 * 60 * 60),
        _ => return Err(invalid()),
    };
    if count == 0 || parts.next().is_some() {
        return Err(invalid());
    }
    Ok((count, window))
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.rate_limit, "1000 per minute");
        assert!(config.security.allow_admin_registration);
        assert_eq!(config.security.access_token_expires_secs, 900);
        assert_eq!(config.security.refresh_token_expires_secs, 604_800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_testing_config() {
        let config = AppConfig::testing();
        assert!(!config.api.enable_rate_limiting);
        assert_eq!(config.security.access_token_expires_secs, 300);
        assert_eq!(config.security.refresh_token_expires_secs, 3600);
    }

    #[test]
    fn test_production_requires_secrets() {
        let mut config = AppConfig::production();
        assert!(matches!(config.validate(), Err(ConfigError::Insecure(_))));

        config.security.jwt_secret = "a-real-secret".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("DATABASE_URL"))));

        config.database.url = Some("postgres://localhost/issues".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.security.allow_admin_registration);
        assert!(!config.api.trust_proxy_headers);
    }

    #[test]
    fn test_parse_rate_limit() {
        assert_eq!(parse_rate_limit("100 per minute").unwrap(), (100, Duration::from_secs(60)));
        assert_eq!(parse_rate_limit("5 per second").unwrap(), (5, Duration::from_secs(1)));
        assert_eq!(parse_rate_limit("2000 per hours").unwrap(), (2000, Duration::from_secs(3600)));
        assert!(parse_rate_limit("0 per minute").is_err());
        assert!(parse_rate_limit("fast").is_err());
        assert!(parse_rate_limit("10 every minute").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://a.test, http://b.test,"),
            vec!["http://a.test", "http://b.test"]
        );
    }
}
