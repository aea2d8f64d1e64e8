use anyhow::{bail, Context};
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn init_db(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let created = DatabaseManager::create_database(&config.database)
        .await
        .context("failed to create database")?;

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;

    let message = if created {
        "Database created and migrated"
    } else {
        "Database already existed; migrations applied"
    };
    output_success(&output_format, message, Some(json!({ "created": created })))
}

pub async fn migrate(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    output_success(&output_format, "Migrations applied", None)
}

pub async fn drop_db(config: &AppConfig, yes: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    if !yes {
        bail!("Refusing to drop tables without --yes");
    }

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    DatabaseManager::drop_all(&pool).await.context("failed to drop tables")?;
    tracing::warn!(
        database = %DatabaseManager::redact_url(&DatabaseManager::database_url(&config.database)),
        "All application tables dropped"
    );
    output_success(&output_format, "All tables dropped", None)
}
