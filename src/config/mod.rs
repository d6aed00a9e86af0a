//! Configuration module for MoodTunes
//!
//! This module contains the application configuration structures and path management.

mod app_config;
mod paths;

pub use app_config::AppConfig;
pub use paths::Paths;

/// Tracks requested per detection
pub const DEFAULT_TRACK_LIMIT: usize = 5;

/// Cover thumbnail edge length in pixels
pub const DEFAULT_COVER_SIZE: u32 = 220;
