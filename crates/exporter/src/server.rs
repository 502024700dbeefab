use crate::sink::{MemorySink, Observation};
use axum::{extract::State, routing::get, Json, Router};
use eyre::WrapErr;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
struct AppState {
    prometheus_handle: PrometheusHandle,
    latest: Arc<MemorySink>,
}

/// Serves the collected gauges for scraping.
pub struct MetricsServer {
    state: AppState,
}

impl MetricsServer {
    /// `latest` mirrors the observations written to the recorder and backs
    /// the `/status` endpoint.
    pub fn new(prometheus_handle: PrometheusHandle, latest: Arc<MemorySink>) -> Self {
        Self {
            state: AppState {
                prometheus_handle,
                latest,
            },
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/status", get(status_handler))
            .with_state(self.state)
    }

    /// Bind the scrape address up front, so a bad address fails startup
    /// instead of leaving the collectors running unobserved.
    pub async fn bind(addr: &str) -> eyre::Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .wrap_err_with(|| format!("Failed to bind metrics server to {}", addr))
    }

    /// Serve on an already bound `listener` until `token` is cancelled.
    pub async fn serve(self, listener: TcpListener, token: CancellationToken) -> eyre::Result<()> {
        tracing::info!("Metrics server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        Ok(())
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM. Returns as soon as the token is
/// cancelled, whoever cancelled it.
pub async fn cancel_on_shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = token.cancelled() => {},
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        },
    }

    token.cancel();
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

async fn status_handler(State(state): State<AppState>) -> Json<Vec<Observation>> {
    Json(state.latest.snapshot())
}
