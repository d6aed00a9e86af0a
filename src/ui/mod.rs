//! Desktop UI
//!
//! `shell` is the window's state machine, `worker` runs the slow parts off the
//! UI thread and `app` draws everything with egui.

mod app;
pub mod shell;
pub mod worker;

pub use app::{MoodTunesApp, APP_TITLE};
pub use worker::Services;

use anyhow::{anyhow, Result};
use eframe::egui;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::utils::BrowserLauncher;

/// Open the main window and block until it is closed
pub fn run(runtime: Runtime, services: Services, browser: Arc<dyn BrowserLauncher>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([980.0, 680.0])
            .with_min_inner_size([520.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(MoodTunesApp::new(cc, runtime, services, browser)))),
    )
    .map_err(|e| anyhow!("UI error: {}", e))
}
