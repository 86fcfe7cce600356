use anyhow::Result;
use domain::InMemoryReportRequestRepository;
use tracing::{info, warn};

use report_system_api::app::{create_app, Storage};
use report_system_api::config::{Config, StorageBackendKind};
use report_system_api::middleware::{init_metrics, logging::init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;
    init_metrics()?;

    info!("Starting Report System API v{}", env!("CARGO_PKG_VERSION"));

    let storage = match config.storage.backend {
        StorageBackendKind::Postgres => {
            let db_config = persistence::db::DatabaseConfig::from(&config.database);
            let pool = persistence::db::create_pool(&db_config).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Storage::Postgres(pool)
        }
        StorageBackendKind::Memory => {
            warn!("Using in-memory storage; report requests are lost on restart");
            Storage::Memory(InMemoryReportRequestRepository::new())
        }
    };

    let addr = config.socket_addr()?;
    let app = create_app(config, storage);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
