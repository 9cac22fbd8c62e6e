//! Portfolio feedback server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio_feedback::config::{Config, LogFormat};
use portfolio_feedback::db::Gateway;
use portfolio_feedback::store::FeedbackStore;
use portfolio_feedback::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing database settings are fatal before anything is served.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Starting portfolio feedback backend");
    tracing::info!("Database file: {:?}", config.database.file_path());
    tracing::info!("Binding: {:?}", config.binding);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_key.is_none() {
        tracing::warn!("No admin key configured (PORTFOLIO_ADMIN_KEY). Deletes are open!");
    }

    let gateway = Arc::new(Gateway::new(config.database.clone()));
    let state = AppState {
        store: FeedbackStore::new(gateway),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
