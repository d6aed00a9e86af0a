//! Presentation state machine
//!
//! Holds everything the window shows, independent of egui. `T` is the
//! retained image type (a texture handle in the app); the shell is the only
//! owner of the current cycle's images and drops them before building the
//! next set of cards.

use image::RgbaImage;

use crate::models::{EmotionLabel, Track};
use crate::utils::BrowserLauncher;

pub const STATUS_CAPTURING: &str = "Opening webcam… press Q to confirm.";
pub const STATUS_FETCHING: &str = "Fetching songs from Spotify…";
pub const STATUS_READY: &str = "Suggestions ready. Pick a song to play!";
pub const STATUS_NO_RESULTS: &str = "No tracks found. Check internet/credentials.";

/// Cards per grid row
pub const GRID_COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Fetching,
    Ready,
    NoResults,
}

/// A track with its decoded cover, as produced by the worker
#[derive(Debug, Clone)]
pub struct LoadedTrack {
    pub track: Track,
    pub cover: Option<RgbaImage>,
}

/// One card on screen
#[derive(Debug)]
pub struct RenderedCard<T> {
    pub track: Track,
    pub row: usize,
    pub column: usize,
    pub cover: Option<T>,
}

pub struct Shell<T> {
    phase: Phase,
    emotion: Option<EmotionLabel>,
    status: String,
    cards: Vec<RenderedCard<T>>,
    resolving_video: bool,
}

impl<T> Default for Shell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Shell<T> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            emotion: None,
            status: String::new(),
            cards: Vec::new(),
            resolving_video: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn emotion_text(&self) -> String {
        match &self.emotion {
            Some(label) => format!("Emotion: {}", label),
            None => "Emotion: —".to_string(),
        }
    }

    pub fn cards(&self) -> &[RenderedCard<T>] {
        &self.cards
    }

    /// Decoded images currently held
    pub fn retained_images(&self) -> usize {
        self.cards.iter().filter(|c| c.cover.is_some()).count()
    }

    /// Whether a new detection may start; never while a video lookup runs
    pub fn trigger_enabled(&self) -> bool {
        !self.resolving_video && !matches!(self.phase, Phase::Capturing | Phase::Fetching)
    }

    /// Whether "Play on YouTube" buttons accept clicks; only on a finished deck
    pub fn play_enabled(&self) -> bool {
        self.phase == Phase::Ready && !self.resolving_video
    }

    /// Start a detection cycle; refused while one is in flight
    pub fn begin_detection(&mut self) -> bool {
        if !self.trigger_enabled() {
            return false;
        }
        self.phase = Phase::Capturing;
        self.status = STATUS_CAPTURING.to_string();
        true
    }

    pub fn emotion_detected(&mut self, emotion: EmotionLabel) {
        if self.phase != Phase::Capturing {
            tracing::debug!("Ignoring emotion {} outside of capture", emotion);
            return;
        }
        self.emotion = Some(emotion);
        self.phase = Phase::Fetching;
        self.status = STATUS_FETCHING.to_string();
    }

    /// Replace all cards with the new cycle's tracks.
    ///
    /// `upload` turns a decoded cover into the retained image type; it is
    /// called once per cover, after the previous cycle's images are dropped.
    pub fn tracks_loaded<F>(&mut self, loaded: Vec<LoadedTrack>, mut upload: F)
    where
        F: FnMut(usize, RgbaImage) -> T,
    {
        if self.phase != Phase::Fetching {
            tracing::debug!("Ignoring {} tracks outside of fetching", loaded.len());
            return;
        }

        self.cards.clear();

        if loaded.is_empty() {
            self.phase = Phase::NoResults;
            self.status = STATUS_NO_RESULTS.to_string();
            return;
        }

        self.cards = loaded
            .into_iter()
            .enumerate()
            .map(|(index, item)| RenderedCard {
                track: item.track,
                row: index / GRID_COLUMNS,
                column: index % GRID_COLUMNS,
                cover: item.cover.map(|img| upload(index, img)),
            })
            .collect();

        self.phase = Phase::Ready;
        self.status = STATUS_READY.to_string();
    }

    /// Open a card's Spotify page; no-op without a URL
    pub fn open_on_catalog(&self, index: usize, browser: &dyn BrowserLauncher) -> bool {
        let Some(url) = self
            .cards
            .get(index)
            .and_then(|card| card.track.spotify_url.as_deref())
        else {
            return false;
        };

        match browser.open_url(url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}", e);
                false
            }
        }
    }

    /// Query for a card's YouTube lookup, or `None` if lookups are not allowed
    pub fn begin_video_lookup(&mut self, index: usize) -> Option<String> {
        if !self.play_enabled() {
            return None;
        }
        let query = self.cards.get(index)?.track.video_query();
        self.resolving_video = true;
        Some(query)
    }

    /// Finish a lookup; opens the video when one was found
    pub fn video_resolved(&mut self, url: Option<String>, browser: &dyn BrowserLauncher) -> bool {
        self.resolving_video = false;

        let Some(url) = url else {
            return false;
        };
        match browser.open_url(&url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::utils::browser::{BrowserError, BrowserLauncher};
    use parking_lot::Mutex;

    /// Records URLs instead of opening them
    #[derive(Default)]
    pub struct RecordingBrowser {
        pub opened: Mutex<Vec<String>>,
    }

    impl BrowserLauncher for RecordingBrowser {
        fn open_url(&self, url: &str) -> Result<(), BrowserError> {
            self.opened.lock().push(url.to_string());
            Ok(())
        }
    }
}
