mod app;
mod render;

use std::{fs, sync::Arc};

use anyhow::{Context, Result};
use insightiq_core::{
    config::{self, AppConfig},
    AppController, FileStore, Gateway, HttpTransport,
};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(
        api_base = %config.api_base,
        state = %config.state_path.display(),
        "Configuration loaded"
    );

    let transport = HttpTransport::new(&config.api_base)?;
    let gateway = Gateway::new(transport);
    let health = match gateway.health().await {
        Ok(status) => {
            info!(%status, "API reachable");
            format!("API {}: {status}", config.api_base)
        }
        Err(err) => {
            warn!(?err, "API health check failed");
            format!("API unreachable: {err}")
        }
    };

    let storage = Arc::new(FileStore::new(&config.state_path));
    let mut controller = AppController::new(storage, config.export_dir.clone());
    controller.set_status(health);

    let mut app = app::InsightApp::new(controller, gateway);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("insightiq.log");
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
