//! Path management for MoodTunes
//!
//! Only the settings file lives on disk; nothing else is persisted.

use std::path::{Path, PathBuf};

/// Filesystem locations used by the application
#[derive(Debug, Clone)]
pub struct Paths {
    config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths, preferring an explicit config directory
    pub fn new(config_override: Option<PathBuf>) -> Self {
        let config_dir = config_override.unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "moodtunes")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        Self { config_dir }
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.toml")
    }

    /// Default location of the emotion model
    pub fn default_model_path(&self) -> PathBuf {
        self.config_dir.join("models").join("emotion-ferplus-8.onnx")
    }
}
