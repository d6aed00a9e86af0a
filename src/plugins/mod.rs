//! Integrations with external services and devices
//!
//! Spotify for recommendations, yt-dlp for YouTube lookups, and the webcam
//! plus emotion model for capture.

pub mod emotion_model;
pub mod spotify;
pub mod webcam;
pub mod youtube;

pub use emotion_model::load_classifier;
pub use spotify::SpotifyCatalog;
pub use webcam::WebcamOpener;
pub use youtube::{VideoResolver, YtDlpResolver};
