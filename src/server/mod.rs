//! Web front-end for epilepsy screening
//!
//! Serves the patient form, runs predictions on uploaded CSV files and,
//! for the forest variant, the generated PDF report.

mod api;
mod error;
mod handlers;
mod pages;
mod state;

pub use api::create_router;
pub use error::{PageError, ServerError};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::model::ScreeningModel;

/// Where the last written report is served
pub const REPORT_URL: &str = "/reports/epilepsy_report.pdf";

/// Load the model and start the server with the given configuration
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let model = ScreeningModel::load(&config.model_path).map_err(|e| {
        anyhow::anyhow!("Failed to load model from {}: {}", config.model_path.display(), e)
    })?;

    if !config.static_dir.is_dir() {
        warn!(static_dir = %config.static_dir.display(), "Static directory not found, pages will render without images");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        variant = %config.variant,
        model = model.kind(),
        n_features = model.n_features(),
        scaling = model.scaling().name(),
        report_path = %config.report_path.display(),
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        started_at = %start_time.to_rfc3339(),
        "Epilepsy screening server starting"
    );

    let state = Arc::new(AppState::new(config, model));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(url = %format!("http://{}", addr), pid = std::process::id(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(start_time))
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal(start_time: chrono::DateTime<chrono::Utc>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl+c, shutting down");
    }
    let stop_time = chrono::Utc::now();
    let uptime = stop_time.signed_duration_since(start_time);
    info!(
        stopped_at = %stop_time.to_rfc3339(),
        uptime_secs = uptime.num_seconds(),
        "Shutdown signal received, stopping server gracefully"
    );
}
