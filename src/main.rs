use skillmatch::handlers::{
    definition_handler, health_handler, index_handler, match_handler, ready_handler,
};
use skillmatch::{AppState, Config};

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillmatch=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting skillmatch service");

    let config = Config::from_env()?;
    let shutdown_timeout = config.shutdown_timeout_secs;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    // Load catalog, embed exemplars, warm up the provider
    let start = std::time::Instant::now();
    let state = Arc::new(AppState::new(config).await?);
    tracing::info!(
        skills = state.catalog.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "State initialized",
    );

    let app = Router::new()
        .route("/match", post(match_handler))
        .route("/skills/:id", get(definition_handler))
        .route("/index", get(index_handler))
        // Health endpoints
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route(
            "/metrics",
            get(move || {
                let handle = prometheus_handle.clone();
                async move { handle.render() }
            }),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Server listening");

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let drained = serve_until_drained(
        server,
        signalled_rx,
        Duration::from_secs(shutdown_timeout),
    )
    .await?;
    if !drained {
        tracing::warn!(
            timeout_secs = shutdown_timeout,
            "Drain timeout elapsed, dropping remaining connections"
        );
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Drive `server` to completion. Once `signalled` fires, in-flight requests
/// get `drain` to finish; returns false if that deadline cut them off.
async fn serve_until_drained<F>(
    server: F,
    signalled: oneshot::Receiver<()>,
    drain: Duration,
) -> std::io::Result<bool>
where
    F: Future<Output = std::io::Result<()>>,
{
    let deadline = async move {
        match signalled.await {
            Ok(()) => {
                tracing::info!(drain_ms = drain.as_millis() as u64, "Draining connections...");
                tokio::time::sleep(drain).await;
            }
            // Server finished without a signal
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server => result.map(|()| true),
        _ = deadline => Ok(false),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
