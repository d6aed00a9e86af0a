//! Cover art download and decoding for track cards

use futures::future::join_all;
use image::imageops::FilterType;
use image::RgbaImage;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::Track;

#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Downloads covers and scales them to square thumbnails
#[derive(Clone)]
pub struct CoverLoader {
    client: reqwest::Client,
    size: u32,
}

impl CoverLoader {
    pub fn new(size: u32, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            size: size.max(1),
        })
    }

    /// Fetch one cover, `None` for missing URLs and any failure
    pub async fn load(&self, url: Option<&str>) -> Option<RgbaImage> {
        let url = url?;
        match self.fetch(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                debug!("Cover {} unavailable: {}", url, e);
                None
            }
        }
    }

    /// Covers for every track, in track order
    pub async fn load_all(&self, tracks: &[Track]) -> Vec<Option<RgbaImage>> {
        join_all(
            tracks
                .iter()
                .map(|track| self.load(track.image_url.as_deref())),
        )
        .await
    }

    async fn fetch(&self, url: &str) -> Result<RgbaImage, ImageFetchError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(decode_thumbnail(&bytes, self.size)?)
    }
}

/// Decode image bytes into an RGBA thumbnail of exactly `size`×`size`
pub fn decode_thumbnail(bytes: &[u8], size: u32) -> Result<RgbaImage, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    Ok(rgb
        .resize_exact(size, size, FilterType::Lanczos3)
        .to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_thumbnail_resizes_exactly() {
        let thumb = decode_thumbnail(&png_bytes(640, 480), 220).unwrap();
        assert_eq!(thumb.dimensions(), (220, 220));
    }

    #[test]
    fn test_decode_thumbnail_rejects_garbage() {
        assert!(decode_thumbnail(b"not an image", 220).is_err());
    }

    #[tokio::test]
    async fn test_missing_url_is_no_image() {
        let loader = CoverLoader::new(220, Duration::from_secs(1)).unwrap();
        assert!(loader.load(None).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_url_is_no_image() {
        let loader = CoverLoader::new(220, Duration::from_secs(1)).unwrap();
        let tracks = vec![
            Track::new("a", "b"),
            Track {
                image_url: Some("http://127.0.0.1:9/cover.jpg".to_string()),
                ..Track::new("c", "d")
            },
        ];

        let covers = loader.load_all(&tracks).await;
        assert_eq!(covers.len(), 2);
        assert!(covers.iter().all(Option::is_none));
    }
}
