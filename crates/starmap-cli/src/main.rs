//! Headless star-map editor session.
//!
//! Opens an editing session against the HTTP galaxy store and keeps it in
//! step with the store until interrupted: background polls are merged and
//! any due persists are flushed. Useful for watching a shared galaxy from a
//! terminal and for exercising a store deployment.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `starmap-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect the HTTP store and load the galaxy
//! 4. Start the background poller
//! 5. Merge polls and flush persists until Ctrl-C
//! 6. Log a summary

mod error;

use std::path::Path;
use std::sync::Arc;

use starmap_core::EditorConfig;
use starmap_core::config::{LogFormat, LoggingConfig};
use starmap_editor::{EditorSession, Poller, Presence};
use starmap_spatial::ScreenSize;
use starmap_store::HttpGalaxyStore;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const CONFIG_PATH: &str = "starmap-config.yaml";

/// Screen the headless session lays the galaxy out on.
const SCREEN_WIDTH: f64 = 1280.0;
const SCREEN_HEIGHT: f64 = 800.0;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the initial load, or the poll task
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        base_url = config.store.base_url,
        poll_interval_ms = config.sync.poll_interval_ms,
        autosave_debounce_ms = config.sync.autosave_debounce_ms,
        "Configuration loaded"
    );

    // 3. Connect and load.
    let store = Arc::new(HttpGalaxyStore::new(&config.store).map_err(CliError::from)?);
    let size = ScreenSize::new(SCREEN_WIDTH, SCREEN_HEIGHT).map_err(CliError::from)?;
    let mut session = EditorSession::load(store.as_ref(), config.clone(), size)
        .await
        .map_err(CliError::from)?;

    // 4. Start polling.
    let poller = Poller::new(&config.sync, Arc::new(Presence::new()));
    let (tx, mut rx) = mpsc::channel(1);
    let poll_task = tokio::spawn(poller.run(Arc::clone(&store), tx));
    info!("Background poller started");

    // 5. Run until interrupted.
    let mut polls: u64 = 0;
    loop {
        let persist_at = session.next_persist_at();
        tokio::select! {
            Some(result) = rx.recv() => {
                session.apply_poll(result);
                polls = polls.saturating_add(1);
            }
            () = wait_until(persist_at) => session.sync(store.as_ref()).await,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for Ctrl-C, stopping");
                }
                break;
            }
        }
    }

    drop(rx);
    poll_task.await.map_err(|e| CliError::Poller {
        message: format!("{e}"),
    })?;

    // 6. Log a summary.
    let galaxy = session.galaxy();
    info!(
        session = %session.id(),
        polls,
        stars = galaxy.stars.len(),
        hyperlanes = galaxy.hyperlanes.len(),
        countries = session.registry().len(),
        "starmap-cli shutdown complete"
    );
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Load `starmap-config.yaml` from the working directory, or defaults when
/// it is absent.
fn load_config() -> Result<EditorConfig, CliError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(EditorConfig::from_file(path)?)
    } else {
        let mut config = EditorConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Resolve at `deadline`, or never.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
