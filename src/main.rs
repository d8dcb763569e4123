use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;

use wardrobe_api::api::{router, AppState};
use wardrobe_api::config::Config;
use wardrobe_api::infrastructure::db;
use wardrobe_api::{jobs, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;
    telemetry::init_tracing(&config);

    tracing::info!("Connecting to database...");
    let pool = db::connect(&config)
        .await
        .context("failed to connect to database")?;
    db::migrate(&pool).await.context("failed to run migrations")?;
    tracing::info!("Database connected and migrated");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let sweep_every = Duration::from_secs(config.subscription_sweep_interval_secs);
    let reconcile_every = Duration::from_secs(config.payment_reconcile_interval_secs);

    let state = AppState::from_pool(pool, config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let jobs = jobs::spawn_all(
        state.subscriptions.clone(),
        sweep_every,
        reconcile_every,
        shutdown_rx,
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("Shutting down background jobs");
    let _ = shutdown_tx.send(true);
    for job in jobs {
        if let Err(err) = job.await {
            tracing::warn!(error = %err, "background job ended abnormally");
        }
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM, waiting for ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Shutdown signal received");
}
