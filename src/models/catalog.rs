//! Raw track shapes returned by the Spotify Web API
//!
//! Only the fields the app reads are modelled; everything else is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogTrack {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub album: CatalogAlbum,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogArtist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogAlbum {
    #[serde(default)]
    pub images: Vec<CatalogImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[cfg(test)]
impl CatalogImage {
    pub fn new(url: impl Into<String>, width: u32) -> Self {
        Self {
            url: url.into(),
            width: Some(width),
            height: Some(width),
        }
    }
}

/// `GET /recommendations` response
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<CatalogTrack>,
}

/// `GET /search?type=track` response
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<CatalogTrack>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "tracks": {
                "items": [{
                    "name": "Walking on Sunshine",
                    "artists": [{"name": "Katrina & The Waves", "id": "x"}],
                    "external_urls": {"spotify": "https://open.spotify.com/track/abc"},
                    "album": {"images": [
                        {"url": "https://i.scdn.co/640", "width": 640, "height": 640},
                        {"url": "https://i.scdn.co/64", "width": 64, "height": 64}
                    ]},
                    "popularity": 80
                }],
                "total": 1
            }
        }"#;

        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let items = parsed.tracks.unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].artists[0].name, "Katrina & The Waves");
        assert_eq!(items[0].album.images[1].width, Some(64));
    }

    #[test]
    fn test_parse_sparse_track() {
        let parsed: RecommendationsResponse =
            serde_json::from_str(r#"{"tracks": [{"name": "Untitled"}]}"#).unwrap();
        let track = &parsed.tracks[0];
        assert!(track.artists.is_empty());
        assert!(track.external_urls.spotify.is_none());
        assert!(track.album.images.is_empty());
    }
}
