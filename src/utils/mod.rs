//! Utility modules

pub mod browser;

pub use browser::{BrowserLauncher, SystemBrowser};
