//! Track model
//!
//! A normalized catalog track as shown on one card.

/// Artist name used when the catalog lists none
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// A recommended track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub artist: String,
    /// Public Spotify page of the track
    pub spotify_url: Option<String>,
    /// Cover image picked from the album artwork
    pub image_url: Option<String>,
}

/// Ordered tracks for one detection cycle
pub type TrackList = Vec<Track>;

impl Track {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
            spotify_url: None,
            image_url: None,
        }
    }

    /// Free-text query used to find the track on YouTube
    pub fn video_query(&self) -> String {
        format!("{} {} audio", self.name, self.artist)
    }
}
