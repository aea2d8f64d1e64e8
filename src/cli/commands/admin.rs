use anyhow::{anyhow, Context};
use clap::Args;
use serde_json::json;
use validator::Validate;

use crate::api::requests::RegisterRequest;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::AuthService;

#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    /// Falls back to ISSUES_ADMIN_PASSWORD so the secret stays out of shell history
    #[arg(long, env = "ISSUES_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub async fn create_admin(
    config: &AppConfig,
    args: CreateAdminArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let password = args
        .password
        .ok_or_else(|| anyhow!("Provide --password or set ISSUES_ADMIN_PASSWORD"))?;

    // Same rules as self-registration
    RegisterRequest {
        username: args.username.clone(),
        email: args.email.clone(),
        password: password.clone(),
        role: None,
    }
    .validate()
    .map_err(|e| anyhow!("Invalid admin account: {e}"))?;

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let user = AuthService::new(pool, &config.security)?
        .create_admin(&args.username, &args.email, &password)
        .await
        .context("failed to create admin")?;

    output_success(
        &output_format,
        &format!("Admin '{}' created", user.username),
        Some(json!({ "id": user.id, "username": user.username })),
    )
}
