//! Data models for MoodTunes
//!
//! This module contains the core data structures passed between capture,
//! recommendation and the UI.

pub mod catalog;
mod emotion;
mod track;

pub use catalog::{CatalogImage, CatalogTrack, RecommendationsResponse, SearchResponse};
pub use emotion::EmotionLabel;
pub use track::{Track, TrackList, UNKNOWN_ARTIST};
