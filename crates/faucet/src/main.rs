//! Faucet service binary

use clap::Parser;
use drip_faucet::api::{
    balance_handler, decommission_handler, fund_handler, health_handler, owner_handler,
    root_handler, status_handler, withdraw_all_handler, withdraw_handler,
};
use drip_faucet::{AuditDatabase, FaucetConfig, FaucetService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Faucet service CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address
    #[arg(long)]
    server_addr: Option<String>,

    /// Owner address (0x-prefixed hex)
    #[arg(long)]
    owner: Option<String>,

    /// Initial pool balance (in wei)
    #[arg(long)]
    initial_balance: Option<String>,

    /// Audit database path
    #[arg(long)]
    db_path: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let env_filter = if args.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Drip Faucet Service v0.1.0");

    // Load configuration and apply CLI overrides
    let mut config = FaucetConfig::from_env();

    if let Some(addr) = args.server_addr {
        config.server_addr = addr;
    }

    if let Some(owner) = args.owner {
        config.owner = owner;
    }

    if let Some(balance) = args.initial_balance {
        config.initial_balance = balance;
    }

    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    info!("Configuration:");
    info!("  Server address: {}", config.server_addr);
    info!("  Owner: {}", config.owner);
    info!("  Initial pool balance: {} wei", config.initial_balance);

    // Initialize audit database
    let database = AuditDatabase::new(&config.db_path)?;
    info!("Audit database initialized at: {}", config.db_path);

    let stats = database.statistics()?;
    info!("Previous audit statistics:");
    info!("  Total operations: {}", stats.total_operations);
    info!("  Total dispensed: {} wei", stats.total_dispensed);

    // Create faucet service (opens the dispenser)
    let cors_enabled = config.cors_enabled;
    let service = Arc::new(FaucetService::new(config.clone(), database)?);
    info!("Faucet service initialized");

    // Build router
    let mut app = axum::Router::new()
        .route("/", axum::routing::get(root_handler))
        .route("/health", axum::routing::get(health_handler))
        .route("/api/status", axum::routing::get(status_handler))
        .route("/api/owner", axum::routing::get(owner_handler))
        .route("/api/balance/:address", axum::routing::get(balance_handler))
        .route("/api/fund", axum::routing::post(fund_handler))
        .route("/api/withdraw", axum::routing::post(withdraw_handler))
        .route("/api/withdraw-all", axum::routing::post(withdraw_all_handler))
        .route(
            "/api/decommission",
            axum::routing::post(decommission_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    // Add CORS if enabled
    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app = app.layer(cors);
        info!("CORS enabled");
    }

    // Start server
    let addr: SocketAddr = config.server_addr.parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
