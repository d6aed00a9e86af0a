//! Application configuration
//!
//! Settings are layered: built-in defaults, then an optional `settings.toml`,
//! then `MOODTUNES_*` environment variables. Spotify credentials additionally
//! come from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` (a `.env` file is
//! loaded first by `main`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{DEFAULT_COVER_SIZE, DEFAULT_TRACK_LIMIT};

const ENV_PREFIX: &str = "MOODTUNES";
const SPOTIFY_CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
const SPOTIFY_CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Spotify client id (client-credentials flow)
    pub spotify_client_id: String,

    /// Spotify client secret
    pub spotify_client_secret: String,

    /// Base URL of the Spotify Web API
    pub spotify_api_url: String,

    /// Base URL of the Spotify accounts service
    pub spotify_auth_url: String,

    /// Optional market (ISO country code) passed to catalog requests
    pub market: Option<String>,

    /// Number of tracks shown per detection
    pub track_limit: usize,

    /// Index of the webcam to open
    pub camera_index: u32,

    /// Path of the ONNX emotion model
    pub model_path: Option<PathBuf>,

    /// Frames whose best emotion score is below this count as "no face"
    pub min_confidence: f32,

    /// Edge length of the square cover thumbnails
    pub cover_size: u32,

    /// Timeout for each cover download
    pub image_timeout_secs: u64,

    /// yt-dlp executable
    pub ytdlp_path: String,

    /// Timeout for one YouTube lookup
    pub video_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            spotify_api_url: "https://api.spotify.com/v1".to_string(),
            spotify_auth_url: "https://accounts.spotify.com/api/token".to_string(),
            market: None,
            track_limit: DEFAULT_TRACK_LIMIT,
            camera_index: 0,
            model_path: None,
            min_confidence: 0.35,
            cover_size: DEFAULT_COVER_SIZE,
            image_timeout_secs: 10,
            ytdlp_path: "yt-dlp".to_string(),
            video_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings file (if present) and environment
    pub fn load(settings_path: &Path) -> Result<Self> {
        let mut config = Self::load_layers(settings_path)?;
        config.apply_credentials(|key| std::env::var(key).ok());
        config.validate();
        Ok(config)
    }

    fn load_layers(settings_path: &Path) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Self::default())
            .context("Failed to build default settings")?;

        let layered = ::config::Config::builder()
            .add_source(defaults)
            .add_source(::config::File::from(settings_path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings from {:?}", settings_path))?;

        layered
            .try_deserialize()
            .context("Failed to parse settings")
    }

    /// Override credentials from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`
    pub fn apply_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(SPOTIFY_CLIENT_ID_VAR).filter(|v| !v.trim().is_empty()) {
            self.spotify_client_id = id.trim().to_string();
        }
        if let Some(secret) = lookup(SPOTIFY_CLIENT_SECRET_VAR).filter(|v| !v.trim().is_empty()) {
            self.spotify_client_secret = secret.trim().to_string();
        }
    }

    /// Clamp values that would make the app unusable
    pub fn validate(&mut self) {
        if self.track_limit == 0 {
            tracing::warn!("track_limit must be at least 1, using 1");
            self.track_limit = 1;
        }
        if self.cover_size == 0 {
            tracing::warn!("cover_size must be at least 1, using 1");
            self.cover_size = 1;
        }
        self.min_confidence = self.min_confidence.clamp(0.0, 1.0);
    }

    pub fn has_spotify_credentials(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn video_timeout(&self) -> Duration {
        Duration::from_secs(self.video_timeout_secs)
    }
}
