//! fluxo - Personal Finance Backend
//!
//! Records monetary movements against externally-owned accounts, settles
//! them asynchronously through a broker-backed pipeline, and serves
//! statements and period analytics.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fluxo::api;
use fluxo::directory::PgAccountDirectory;
use fluxo::gateway::{HttpBalanceSource, HttpRateSource};
use fluxo::service::TransactionService;
use fluxo::settlement::{ConsumerPool, SettlementBroker};
use fluxo::store::PgTransactionStore;
use fluxo::{db, Config};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fluxo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
fn build_router(service: Arc<TransactionService>) -> Router {
    Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        // Service surface
        .nest("/api/v1", api::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting fluxo server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    // Verify database schema
    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");

    // External gateways, finite timeouts
    let rates = Arc::new(HttpRateSource::new(
        config.rate_api_url.clone(),
        config.gateway_timeout(),
    )?);
    let balances = Arc::new(HttpBalanceSource::new(
        config.balance_api_url.clone(),
        config.gateway_timeout(),
    )?);

    // Settlement pipeline: broker, worker pool, dead-letter handler
    let store = Arc::new(PgTransactionStore::new(pool.clone()));
    let directory = Arc::new(PgAccountDirectory::new(pool.clone()));
    let (broker, queues) = SettlementBroker::new(config.settlement_topic.clone());
    let consumers = ConsumerPool::new(
        store.clone(),
        broker.clone(),
        config.retry_policy(),
        config.settlement_workers,
    );
    let worker_handles = consumers.start(queues);

    let service = Arc::new(TransactionService::new(
        directory,
        store,
        rates,
        balances,
        Arc::new(broker),
    ));

    tracing::info!("Listening on http://{}", addr);

    // Build router and start server
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    for handle in worker_handles {
        handle.abort();
    }
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
