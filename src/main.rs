//! MoodTunes - music suggestions from your facial expression
//!
//! Reads your emotion from the webcam, maps it to Spotify seed genres and
//! shows matching tracks that can be opened on Spotify or played on YouTube.

mod config;
mod core;
mod models;
mod plugins;
mod ui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// MoodTunes - emotion-based music player
#[derive(Parser, Debug)]
#[command(name = "moodtunes")]
#[command(version)]
#[command(about = "Detect your mood from the webcam and get matching songs")]
struct Args {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to a settings file (defaults to settings.toml in the config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // credentials usually live in a .env next to the binary
    let dotenv_loaded = dotenv::dotenv().is_ok();

    // initialize logging with filters to suppress noisy dependency output
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "{},wgpu=warn,eframe=warn,egui_glow=warn,winit=warn,ort=warn,nokhwa=warn",
        log_level
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("MoodTunes v{} starting...", env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    let paths = config::Paths::new(None);
    info!("Config directory: {:?}", paths.config_dir());
    let settings_path = args.config.unwrap_or_else(|| paths.settings_path());
    info!("Settings file: {:?}", settings_path);

    let app_config = config::AppConfig::load(&settings_path)?;
    if !app_config.has_spotify_credentials() {
        warn!(
            "SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET are not set; \
             track suggestions will be empty"
        );
    }

    if !plugins::webcam::is_available() {
        warn!(
            "Built without the `webcam` feature; no camera preview will open and \
             every detection returns \"neutral\""
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("moodtunes-worker")
        .build()
        .context("Failed to start async runtime")?;

    let services = ui::Services::from_config(&app_config, &paths)?;

    ui::run(runtime, services, Arc::new(utils::SystemBrowser))
}
