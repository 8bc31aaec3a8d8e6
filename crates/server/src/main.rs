mod app;
mod auth;
mod config;
mod error;
mod routes;

#[cfg(test)]
mod tests;

use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testgen_server=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    error::expose_internal_errors(config.env.is_development());
    let port = config.port;
    tracing::info!(env = ?config.env, origins = ?config.frontend_origins, "configuration loaded");

    let state = app::AppState::from_config(config)?;
    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("Test Case Generator API listening on port {port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}
