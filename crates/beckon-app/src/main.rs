use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use beckon_config::Config;
use beckon_core::dom::MemoryDocument;
use beckon_types::AppEvent;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod controller;
mod events;
mod host;
mod io;
mod state;
mod status;

#[cfg(test)]
mod tests;

use self::cli::Cli;
use self::controller::AppController;
use self::state::{AppState, CameraSource};

/// A pending stdin read cannot be interrupted, so shutdown does not wait on it
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.json_logs || !atty::is(atty::Stream::Stderr));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr; stdout carries command feedback
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .flatten_event(true),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing init warning: {}", e);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::new(),
    };

    let raw = std::fs::read_to_string(&cli.page)
        .with_context(|| format!("Failed to read page {}", cli.page.display()))?;
    let page = MemoryDocument::from_json(&raw)
        .with_context(|| format!("Invalid page description {}", cli.page.display()))?;

    let camera = match cli.frames {
        Some(dir) => CameraSource::Directory(dir),
        None => CameraSource::Solid(cli.brightness),
    };

    let state = Arc::new(AppState::new(config, page, camera));
    let controller = AppController::new(state);

    if cli.gesture {
        controller
            .sender()
            .send(AppEvent::GestureControl { enabled: true })
            .await?;
    }

    let mut tasks = controller.spawn_tasks();
    tracing::info!("Type a phrase to issue a voice command; ':listen' starts listening");

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("task failed: {e:#}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task failed during shutdown: {e:#}"),
            Err(e) => tracing::error!("task panicked during shutdown: {e}"),
        }
    }

    Ok(())
}
