//! Core functionality: capture, genre mapping, recommendations and covers

pub mod capture;
pub mod genres;
pub mod images;
pub mod tracks;

pub use capture::{
    Camera, CameraOpener, CaptureError, EmotionCapture, EmotionClassifier, FrameSink, Overlay,
};
pub use images::CoverLoader;
pub use tracks::{CatalogError, MusicCatalog, TrackSource};
