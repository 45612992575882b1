use anyhow::Result;
use screenshot_uploader::{
    config::{self, AppConfig},
    routes::routes::routes,
    services::storage_service::S3ObjectStore,
    state::AppState,
};
use std::{io::ErrorKind, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // --- Environment file (optional) ---
    let dotenv = dotenvy::dotenv();

    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // --- Parse + validate config ---
    let cfg = AppConfig::from_env_and_args();
    if let Err(err) = cfg.validate() {
        for problem in &err.0 {
            tracing::error!("Configuration error: {}", problem);
        }
        return Err(err.into());
    }
    log_config(&cfg);

    // --- Initialize storage client ---
    let store = S3ObjectStore::from_config(&cfg).await;
    let state = AppState::new(cfg, Arc::new(store));

    // --- Keep limiter state bounded ---
    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.prune();
        }
    });

    // --- Build router ---
    let addr = state.config.addr();
    let port = state.config.port;
    let bind_all = matches!(state.config.host.as_str(), "0.0.0.0" | "::");
    let app = routes(state);

    // --- Start server ---
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) if err.kind() == ErrorKind::PermissionDenied && bind_all => {
            let fallback_addr = format!("127.0.0.1:{}", port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn log_config(cfg: &AppConfig) {
    tracing::info!("Configuration:");
    tracing::info!("  - S3 Bucket: {}", cfg.bucket);
    tracing::info!("  - CDN Domain: {}", cfg.delivery_domain);
    tracing::info!("  - Key Prefix: {}", cfg.key_prefix);
    tracing::info!(
        "  - Max File Size: {}",
        config::format_file_size(cfg.max_file_size_bytes)
    );
    tracing::info!(
        "  - Allowed Extensions: {}",
        cfg.allowed_extensions.join(", ")
    );
    tracing::info!(
        "  - Rate Limit: {} requests / {}s",
        cfg.rate_limit.max_requests,
        cfg.rate_limit.window.as_secs()
    );
    tracing::info!(
        "  - Upload Secret: {}",
        if cfg.upload_secret.is_some() {
            "Configured"
        } else {
            "Not configured (open access)"
        }
    );
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
