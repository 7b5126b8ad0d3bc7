use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use news_snapshot_api::error::{AppError, Result};
use news_snapshot_api::{build_router, AppState, Config, HttpSource, NewsService, SnapshotCache};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) => Some(PathBuf::from(args.get(i + 1).ok_or_else(|| {
            AppError::Config("--config requires a path".to_string())
        })?)),
        None => None,
    };

    // Headless mode: download the snapshot once and exit
    let headless_refresh = args.iter().any(|a| a == "--refresh");

    let config = Config::load(config_path.as_deref())?;

    let source = HttpSource::new(&config.snapshot_url, config.fetch_timeout())?;
    let cache = Arc::new(SnapshotCache::new(
        config.cache_path.clone(),
        config.cache_duration(),
        Arc::new(source),
    ));

    if headless_refresh {
        let size = cache.refresh().await?;
        println!("Stored {} bytes at {}", size, cache.path().display());
        return Ok(());
    }

    let app = build_router(AppState::new(NewsService::new(cache)));

    let listener = TcpListener::bind(config.socket_addr()?).await?;
    tracing::info!(
        "Serving on {} (snapshot {}, refreshed every {}s)",
        listener.local_addr()?,
        config.snapshot_url,
        config.cache_duration_secs
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
