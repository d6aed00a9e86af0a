//! Track recommendations for a detected emotion
//!
//! Asks the catalog for genre-seeded recommendations and falls back to a
//! free-text "<emotion> mood" search when that fails or comes back empty.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::genres::seed_genre;
use crate::models::{CatalogImage, CatalogTrack, EmotionLabel, Track, TrackList, UNKNOWN_ARTIST};

/// Errors raised by a music catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Spotify credentials are not configured")]
    MissingCredentials,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A music catalog offering recommendations and track search
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Tracks recommended for a seed genre
    async fn recommendations(
        &self,
        genre: &str,
        limit: usize,
    ) -> Result<Vec<CatalogTrack>, CatalogError>;

    /// Free-text track search
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogTrack>, CatalogError>;
}

/// Produces the track list for one detection cycle
#[derive(Clone)]
pub struct TrackSource {
    catalog: Arc<dyn MusicCatalog>,
}

impl TrackSource {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { catalog }
    }

    /// Up to `limit` tracks for the emotion; empty when every lookup failed
    pub async fn tracks_by_emotion(&self, emotion: &EmotionLabel, limit: usize) -> TrackList {
        let limit = limit.max(1);
        let genre = seed_genre(emotion);

        let mut tracks = match self.catalog.recommendations(genre, limit).await {
            Ok(raw) => normalize_all(&raw),
            Err(e) => {
                warn!("Recommendations for genre '{}' failed: {}", genre, e);
                Vec::new()
            }
        };

        if tracks.is_empty() {
            tracks = self.search_fallback(emotion, limit).await;
        }

        tracks.truncate(limit);
        info!(
            "Found {} tracks for emotion '{}' (seed genre '{}')",
            tracks.len(),
            emotion,
            genre
        );
        tracks
    }

    /// The "<emotion> mood" search used when recommendations give nothing
    pub async fn search_fallback(&self, emotion: &EmotionLabel, limit: usize) -> TrackList {
        let query = format!("{} mood", emotion);
        debug!("Falling back to track search: {:?}", query);

        match self.catalog.search_tracks(&query, limit).await {
            Ok(raw) => {
                let mut tracks = normalize_all(&raw);
                tracks.truncate(limit);
                tracks
            }
            Err(e) => {
                warn!("Track search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

fn normalize_all(raw: &[CatalogTrack]) -> TrackList {
    raw.iter().map(normalize_track).collect()
}

/// Turn a raw catalog track into the record shown on a card
pub fn normalize_track(raw: &CatalogTrack) -> Track {
    let artist = raw
        .artists
        .first()
        .map(|a| a.name.clone())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let mut track = Track::new(raw.name.clone(), artist);
    track.spotify_url = raw.external_urls.spotify.clone();
    track.image_url = best_image(&raw.album.images).map(|img| img.url.clone());
    track
}

/// Pick a medium-sized cover: the second smallest by width, or the only one
pub fn best_image(images: &[CatalogImage]) -> Option<&CatalogImage> {
    if images.is_empty() {
        return None;
    }

    let mut by_width: Vec<&CatalogImage> = images.iter().collect();
    by_width.sort_by_key(|img| img.width.unwrap_or(0));
    by_width.get(1.min(by_width.len() - 1)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{CatalogAlbum, CatalogArtist, ExternalUrls};
    use parking_lot::Mutex;

    fn raw_track(name: &str, artist: Option<&str>) -> CatalogTrack {
        CatalogTrack {
            name: name.to_string(),
            artists: artist
                .map(|a| {
                    vec![CatalogArtist {
                        name: a.to_string(),
                    }]
                })
                .unwrap_or_default(),
            external_urls: ExternalUrls {
                spotify: Some(format!("https://open.spotify.com/track/{}", name)),
            },
            album: CatalogAlbum {
                images: vec![
                    CatalogImage::new(format!("{}-640", name), 640),
                    CatalogImage::new(format!("{}-64", name), 64),
                    CatalogImage::new(format!("{}-300", name), 300),
                ],
            },
        }
    }

    fn raw_tracks(prefix: &str, count: usize) -> Vec<CatalogTrack> {
        (0..count)
            .map(|i| raw_track(&format!("{}{}", prefix, i), Some("Artist")))
            .collect()
    }

    /// Scripted catalog that records every call
    struct FakeCatalog {
        recommendations: Result<Vec<CatalogTrack>, ()>,
        search: Result<Vec<CatalogTrack>, ()>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn new(
            recommendations: Result<Vec<CatalogTrack>, ()>,
            search: Result<Vec<CatalogTrack>, ()>,
        ) -> Arc<Self> {
            Arc::new(Self {
                recommendations,
                search,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl MusicCatalog for FakeCatalog {
        async fn recommendations(
            &self,
            genre: &str,
            limit: usize,
        ) -> Result<Vec<CatalogTrack>, CatalogError> {
            self.calls
                .lock()
                .push(format!("recommendations:{}:{}", genre, limit));
            self.recommendations
                .clone()
                .map_err(|_| CatalogError::Status {
                    status: 401,
                    message: "invalid client".to_string(),
                })
        }

        async fn search_tracks(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<CatalogTrack>, CatalogError> {
            self.calls.lock().push(format!("search:{}:{}", query, limit));
            self.search.clone().map_err(|_| CatalogError::MissingCredentials)
        }
    }

    #[test]
    fn test_best_image_second_smallest() {
        let images = vec![
            CatalogImage::new("w300", 300),
            CatalogImage::new("w64", 64),
            CatalogImage::new("w150", 150),
        ];
        assert_eq!(best_image(&images).unwrap().url, "w150");
    }

    #[test]
    fn test_best_image_single_and_empty() {
        let single = vec![CatalogImage::new("only", 640)];
        assert_eq!(best_image(&single).unwrap().url, "only");
        assert!(best_image(&[]).is_none());
    }

    #[test]
    fn test_best_image_missing_width_sorts_first() {
        let images = vec![
            CatalogImage::new("w640", 640),
            CatalogImage {
                url: "unknown".to_string(),
                width: None,
                height: None,
            },
            CatalogImage::new("w300", 300),
        ];
        assert_eq!(best_image(&images).unwrap().url, "w300");
    }

    #[test]
    fn test_normalize_track_without_artist() {
        let mut raw = raw_track("Song", None);
        raw.external_urls.spotify = None;
        raw.album.images.clear();

        let track = normalize_track(&raw);
        assert_eq!(track.name, "Song");
        assert_eq!(track.artist, "Unknown");
        assert!(track.spotify_url.is_none());
        assert!(track.image_url.is_none());
    }

    #[test]
    fn test_normalize_track_uses_first_artist() {
        let mut raw = raw_track("Song", Some("First"));
        raw.artists.push(CatalogArtist {
            name: "Second".to_string(),
        });

        let track = normalize_track(&raw);
        assert_eq!(track.artist, "First");
        assert_eq!(track.image_url.as_deref(), Some("Song-300"));
    }

    #[tokio::test]
    async fn test_recommendations_seeded_by_first_genre() {
        let catalog = FakeCatalog::new(Ok(raw_tracks("rec", 5)), Ok(raw_tracks("search", 5)));
        let source = TrackSource::new(catalog.clone());

        let tracks = source.tracks_by_emotion(&EmotionLabel::new("happy"), 5).await;

        assert_eq!(tracks.len(), 5);
        assert_eq!(tracks[0].name, "rec0");
        assert_eq!(catalog.calls(), vec!["recommendations:pop:5".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_recommendations_match_direct_search() {
        let catalog = FakeCatalog::new(Err(()), Ok(raw_tracks("search", 3)));
        let source = TrackSource::new(catalog.clone());
        let emotion = EmotionLabel::new("sad");

        let tracks = source.tracks_by_emotion(&emotion, 5).await;
        let direct = source.search_fallback(&emotion, 5).await;

        assert_eq!(tracks, direct);
        assert_eq!(tracks.len(), 3);
        assert_eq!(
            catalog.calls()[..2],
            [
                "recommendations:acoustic:5".to_string(),
                "search:sad mood:5".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_recommendations_fall_back() {
        let catalog = FakeCatalog::new(Ok(Vec::new()), Ok(raw_tracks("search", 2)));
        let source = TrackSource::new(catalog.clone());

        let tracks = source.tracks_by_emotion(&EmotionLabel::new("fear"), 5).await;

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "search0");
        assert_eq!(catalog.calls()[1], "search:fear mood:5");
    }

    #[tokio::test]
    async fn test_both_failing_yields_empty_list() {
        let catalog = FakeCatalog::new(Err(()), Err(()));
        let source = TrackSource::new(catalog);

        let tracks = source.tracks_by_emotion(&EmotionLabel::new("angry"), 5).await;
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_result_never_exceeds_limit() {
        for limit in 1..=7 {
            let catalog = FakeCatalog::new(Ok(raw_tracks("rec", 10)), Ok(raw_tracks("s", 10)));
            let source = TrackSource::new(catalog);
            let tracks = source
                .tracks_by_emotion(&EmotionLabel::new("neutral"), limit)
                .await;
            assert_eq!(tracks.len(), limit);
        }

        let catalog = FakeCatalog::new(Err(()), Ok(raw_tracks("s", 10)));
        let source = TrackSource::new(catalog);
        let tracks = source.tracks_by_emotion(&EmotionLabel::new("happy"), 2).await;
        assert_eq!(tracks.len(), 2);
    }
}
