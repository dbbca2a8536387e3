//! Battlecry Server
//!
//! Compile backend and file store for the browser-based Dart editor.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use battlecry_sandbox::{
    CompileLimits, CompileService, DartToolchain, SweepPolicy, TempSweeper, WorkspaceManager,
};
use battlecry_server::services::file_store::{FileStore, MemoryFileStore, PgFileStore};
use battlecry_server::{routes, AppState, Config};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting Battlecry server...");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let file_store = connect_file_store(&config).await?;
    info!(backend = file_store.backend(), "File store ready");

    // Prepare the temp root and compiler
    let workspaces = WorkspaceManager::new(&config.temp_dir);
    workspaces
        .ensure_root()
        .await
        .with_context(|| format!("Failed to create temp dir {}", config.temp_dir.display()))?;
    info!(root = %workspaces.root().display(), "Temp root ready");

    let limits = CompileLimits::default().with_max_concurrent(config.max_concurrent_compiles);
    let compile_service =
        CompileService::new(workspaces, DartToolchain::new(config.dart_bin.clone()), limits)?;

    if !compile_service.probe_toolchain().await {
        warn!(
            dart_bin = %config.dart_bin,
            "Dart SDK not available, compile requests will fail until it is installed"
        );
    }

    // Startup sweep, then hourly
    let sweeper = TempSweeper::new(&config.temp_dir, SweepPolicy::default());
    let sweep_task = sweeper.clone().spawn();

    let app_state = AppState::new(compile_service, file_store);
    info!("Services initialized");

    let bind_addr = config.bind_addr();
    info!("Starting server on {}", bind_addr);

    let served = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await;

    sweep_task.abort();
    let report = sweeper.sweep_once().await;
    info!(
        removed = report.removed,
        failed = report.failed,
        "Shutdown sweep complete"
    );

    served.context("HTTP server error")
}

async fn connect_file_store(config: &Config) -> anyhow::Result<Arc<dyn FileStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, file store is in-memory and will not persist");
        return Ok(Arc::new(MemoryFileStore::new()));
    };

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations complete");

    Ok(Arc::new(PgFileStore::new(db_pool)))
}
