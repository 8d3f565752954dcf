//! Router assembly and the listener loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use landtrend_arima::ArimaConfig;
use landtrend_classify::ClassifyConfig;
use landtrend_io::RasterConfig;

use crate::routes;

/// Read-only settings shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub raster: RasterConfig,
    pub arima: ArimaConfig,
    pub classify: ClassifyConfig,
}

/// Builds the API router.
///
/// CORS allows any origin, method and header. `body_limit` caps upload size
/// in bytes.
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/process/markov-inputs", post(routes::markov_inputs))
        .route("/process/csv-data", post(routes::csv_data))
        .route("/trend/markov", post(routes::markov))
        .route("/trend/regression", post(routes::regression))
        .route("/trend/arima", post(routes::arima))
        .route("/trend/logistic-spatial", post(routes::logistic_spatial))
        .route(
            "/trend/randomforest-spatial",
            post(routes::randomforest_spatial),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Binds `host:port` and serves `app` until Ctrl-C.
pub async fn serve(app: Router, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    let local = listener
        .local_addr()
        .context("failed to read listener address")?;
    info!(%local, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
