//! Pull-tab engine HTTP server.
//!
//! Loads configuration, migrates the database, starts the expiry sweeper and
//! serves the API until SIGINT or SIGTERM.

use anyhow::Context;
use pulltab::aggregates::TicketEnvironment;
use pulltab::api::AdminToken;
use pulltab::config::Config;
use pulltab::notify::LogNotifier;
use pulltab::server::{build_router, routes::cors_layer, AppState};
use pulltab::service::PullTabService;
use pulltab::sweeper::ExpirySweeper;
use pulltab_core::environment::SystemClock;
use pulltab_runtime::metrics::MetricsRecorder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pull-tab server");
    info!(
        bind = %config.bind_address(),
        ticket_ttl_secs = config.engine.ticket_ttl_secs,
        sweep_interval_secs = config.engine.sweep_interval_secs,
        admin_enabled = config.admin.token.is_some(),
        "Configuration loaded"
    );

    let mut recorder = MetricsRecorder::new();
    recorder.install().context("failed to install metrics recorder")?;
    pulltab::metrics::register_business_metrics();

    info!("Connecting to database...");
    let pool = pulltab_postgres::connect(&config.postgres)
        .await
        .context("failed to connect to PostgreSQL")?;
    pulltab::persistence::migrate(&pool)
        .await
        .context("failed to run migrations")?;

    let env = TicketEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(LogNotifier),
        config.engine.ticket_ttl(),
    );
    let service = PullTabService::new(pool, env);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let sweeper = ExpirySweeper::new(
        service.clone(),
        config.engine.sweep_interval(),
        config.engine.sweep_batch(),
        shutdown_tx.subscribe(),
    )
    .spawn();

    let state = AppState::new(service, AdminToken::new(config.admin.token.clone()))
        .with_metrics(Arc::new(recorder));
    let app = build_router(state).layer(cors_layer(&config.server.allowed_origins));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped, stopping background tasks...");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(Duration::from_secs(config.server.shutdown_timeout), sweeper).await {
        Ok(Ok(())) => info!("Expiry sweeper stopped gracefully"),
        Ok(Err(e)) => warn!(error = %e, "Expiry sweeper task failed"),
        Err(_) => warn!("Expiry sweeper shutdown timed out"),
    }

    info!("Graceful shutdown complete");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is ignored.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
