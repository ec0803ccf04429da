use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use lotto2d_lib::{HttpSource, IngestUseCase, QueryUseCase, config, open_store, refresh, routes};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = config::load()?;

    tracing::info!("Let's watch some 2D draws.");

    let store = open_store(&config)?;
    let source = Arc::new(HttpSource::new(config.upstream.clone())?);

    let ingest_use_case = Arc::new(IngestUseCase::new(Arc::clone(&store), source));
    let query_use_case = Arc::new(QueryUseCase::new(Arc::clone(&store)));

    if config.refresh_minutes > 0 {
        tracing::info!("🔁 Refreshing results every {} minutes", config.refresh_minutes);
        refresh::spawn(
            Arc::clone(&ingest_use_case),
            Duration::from_secs(config.refresh_minutes * 60),
        );
    }

    let app = routes::router(ingest_use_case, query_use_case);

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("🎰 Serving lottery API on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
