use std::net::SocketAddr;

use anyhow::Context;
use issue_tracker::{
    app::{app, AppState},
    config,
    database::DatabaseManager,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    telemetry::init(&config.logging);
    config.validate().context("invalid configuration")?;

    tracing::info!(
        environment = ?config.environment,
        version = %config.app.version,
        "Starting {}",
        config.app.name
    );

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    tracing::info!(
        database = %DatabaseManager::redact_url(&DatabaseManager::database_url(&config.database)),
        "Database pool configured"
    );

    if config.database.auto_migrate {
        // The server still starts without a database; /health reports degraded
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            tracing::error!("Automatic migration failed: {}", e);
        }
    }

    let state = AppState::new(pool, config.clone())?;
    let router = app(state);

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
