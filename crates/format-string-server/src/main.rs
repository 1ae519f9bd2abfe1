use anyhow::Context;
use format_string::FormatStringConfig;
use format_string_server::config::ServerConfig;
use format_string_server::{AppState, observability, router};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env()?;
    observability::init(server_config.observability())?;

    let config = FormatStringConfig::from_env();
    info!("Saving node state under {}", config.output_dir.display());

    let app = router(AppState::new(config));
    let listener = TcpListener::bind(server_config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server_config.bind_addr))?;
    info!("Listening on http://{}", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down server");
}
