//! Sakila API server - CRUD over the Sakila dataset behind a JWT login gate

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use sakila_api::{AppState, create_router};
use sakila_auth::JwtManager;
use sakila_db::Database;

/// Sakila API server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "SAKILA_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SAKILA_PORT")]
    port: Option<u16>,

    /// Token signing secret (overrides auth.jwt_secret)
    #[arg(long, env = "SAKILA_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Sakila API v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_default_secret() {
        warn!("auth.jwt_secret is the default placeholder; set SAKILA_JWT_SECRET in production");
    }

    // Create data directory for the database file
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;
    info!("{} registered user(s)", db.count_users().await?);

    // Initialize JWT manager
    let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.validated_ttl_secs())?
        .with_retired_keys(&config.auth.retired_secrets);
    if !config.auth.retired_secrets.is_empty() {
        info!(
            "Accepting tokens from {} retired secret(s)",
            config.auth.retired_secrets.len()
        );
    }

    // Create application state
    let state = AppState::new(db, Arc::new(jwt), config.auth.hash)?;

    // Install Prometheus recorder
    let metrics_handle = if config.metrics.enabled {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C handler: {}", e);
        // Without a handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
