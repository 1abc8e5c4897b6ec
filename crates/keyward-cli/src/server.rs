//! Server and migration entry points.

use anyhow::{Context, Result};
use keyward_api::{AppState, build_app};
use keyward_core::clock::SystemClock;
use keyward_db::Database;
use keyward_trace::{TracingConfig, init_tracer, shutdown_tracer};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::settings::ServerConfig;

/// Run `task` with the configured tracer installed, flushing exported
/// spans once it finishes, whether or not it succeeded.
pub async fn traced<T>(
    tracing: &TracingConfig,
    task: impl Future<Output = Result<T>>,
) -> Result<T> {
    init_tracer(tracing)?;
    let result = task.await;
    shutdown_tracer();
    result
}

pub async fn serve(config: &ServerConfig) -> Result<()> {
    let state = if config.in_memory {
        warn!("Using the in-memory store; all data is lost on shutdown");
        AppState::in_memory(Arc::new(SystemClock))
    } else {
        let db = connect(config.database_url.as_deref(), config.max_connections).await?;
        db.migrate().await.context("failed to run migrations")?;
        AppState::from_database(&db)
    };

    let app = build_app(Arc::new(state));
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;

    info!(address = %config.bind, "Keyward server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Keyward server stopped");
    Ok(())
}

pub async fn migrate(database_url: Option<&str>, max_connections: u32) -> Result<()> {
    let db = connect(database_url, max_connections).await?;
    db.migrate().await.context("failed to run migrations")?;
    info!("Migrations applied");
    Ok(())
}

async fn connect(database_url: Option<&str>, max_connections: u32) -> Result<Database> {
    let url = database_url
        .context("a database URL is required (--database-url, DATABASE_URL or KEYWARD_DATABASE_URL)")?;
    Database::connect_with(url, max_connections)
        .await
        .context("failed to connect to database")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
