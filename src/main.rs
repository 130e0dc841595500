use anyhow::Context;
use tracing_subscriber::EnvFilter;

use srh_restaurant_api::{app, config, database::Database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting SRH Restaurant API in {:?} mode", config.environment);
    if config.security.jwt_secret == config::DEFAULT_JWT_SECRET {
        tracing::warn!("JWT_SECRET is not set; using the built-in default secret");
    }

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    db.ensure_collections().await.context("failed to create collections")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(db.clone(), config).context("invalid token configuration")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("SRH Restaurant API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
