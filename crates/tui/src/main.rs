mod app;
mod form;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use leaguedesk_core::{
    config::{self, AppConfig},
    session::SessionStore,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

const NOTICE_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(api = %config.api_base(), storage = %config.storage_dir.display(), "Starting leaguedesk");

    let store = SessionStore::from_config(&config).context("failed to build backend client")?;
    let (notice_tx, notice_rx) = mpsc::channel(NOTICE_BUFFER);
    store.attach_notices(notice_tx);

    let mut app = app::LeaguedeskApp::new(store);
    app.attach_notices(notice_rx);
    app.run().await
}

// The terminal belongs to the UI, so logs only go to a file.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("leaguedesk.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
