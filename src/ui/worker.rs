//! Background work for the window
//!
//! Capture, catalog lookups and cover downloads run on the tokio runtime and
//! report back through `AppEvent`s, so the event loop never blocks. Only one
//! detection cycle and one video lookup run at a time; the shell enforces it.
//! Webcam frames skip the event queue and go through a `PreviewSlot` that
//! holds only the newest frame.

use anyhow::Context;
use image::RgbImage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::error;

use super::shell::LoadedTrack;
use crate::config::{AppConfig, Paths};
use crate::core::{CoverLoader, EmotionCapture, FrameSink, Overlay, TrackSource};
use crate::models::EmotionLabel;
use crate::plugins::{load_classifier, SpotifyCatalog, VideoResolver, WebcamOpener, YtDlpResolver};

/// Messages from workers to the UI thread
#[derive(Debug)]
pub enum AppEvent {
    CaptureFinished,
    EmotionDetected(EmotionLabel),
    TracksLoaded(Vec<LoadedTrack>),
    VideoResolved(Option<String>),
}

/// Sends events and wakes the UI
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<AppEvent>,
    wake: Arc<dyn Fn() + Send + Sync>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<AppEvent>, wake: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self { tx, wake }
    }

    pub fn send(&self, event: AppEvent) {
        // the receiver only goes away when the window closes
        if self.tx.send(event).is_ok() {
            (self.wake)();
        }
    }

    pub fn wake(&self) {
        (self.wake)();
    }
}

/// The newest annotated webcam frame not yet shown
#[derive(Clone, Default)]
pub struct PreviewSlot {
    latest: Arc<Mutex<Option<(RgbImage, Overlay)>>>,
}

impl PreviewSlot {
    /// Store a frame, replacing any frame the UI has not picked up
    pub fn publish(&self, frame: RgbImage, overlay: Overlay) {
        *self.latest.lock() = Some((frame, overlay));
    }

    pub fn take(&self) -> Option<(RgbImage, Overlay)> {
        self.latest.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.latest.lock().is_some()
    }
}

/// Everything a detection cycle needs
#[derive(Clone)]
pub struct Services {
    pub capture: EmotionCapture,
    pub tracks: TrackSource,
    pub covers: CoverLoader,
    pub videos: Arc<dyn VideoResolver>,
    pub track_limit: usize,
}

impl Services {
    pub fn from_config(config: &AppConfig, paths: &Paths) -> anyhow::Result<Self> {
        let model_path = config
            .model_path
            .clone()
            .unwrap_or_else(|| paths.default_model_path());
        let classifier = load_classifier(&model_path, config.min_confidence);

        let catalog = SpotifyCatalog::new(config).context("Failed to build Spotify client")?;
        let covers = CoverLoader::new(config.cover_size, config.image_timeout())
            .context("Failed to build cover image client")?;

        Ok(Self {
            capture: EmotionCapture::new(Arc::new(WebcamOpener), classifier, config.camera_index),
            tracks: TrackSource::new(Arc::new(catalog)),
            covers,
            videos: Arc::new(YtDlpResolver::new(
                config.ytdlp_path.clone(),
                config.video_timeout(),
            )),
            track_limit: config.track_limit,
        })
    }
}

/// Forwards capture frames to the UI and reads the confirmation flag
pub struct PreviewSink {
    events: EventSender,
    preview: PreviewSlot,
    confirm: Arc<AtomicBool>,
}

impl PreviewSink {
    pub fn new(events: EventSender, preview: PreviewSlot, confirm: Arc<AtomicBool>) -> Self {
        Self {
            events,
            preview,
            confirm,
        }
    }
}

impl FrameSink for PreviewSink {
    fn present(&mut self, frame: RgbImage, overlay: Overlay) {
        self.preview.publish(frame, overlay);
        self.events.wake();
    }

    fn confirmed(&mut self) -> bool {
        self.confirm.load(Ordering::SeqCst)
    }

    fn finish(&mut self) {
        self.events.send(AppEvent::CaptureFinished);
    }
}

/// Run capture → recommendations → covers, posting each step
pub fn spawn_detection(
    runtime: &Handle,
    services: Services,
    events: EventSender,
    preview: PreviewSlot,
    confirm: Arc<AtomicBool>,
) -> JoinHandle<()> {
    confirm.store(false, Ordering::SeqCst);

    runtime.spawn(async move {
        let capture = services.capture.clone();
        let mut sink = PreviewSink::new(events.clone(), preview, confirm);

        let emotion = tokio::task::spawn_blocking(move || capture.detect_emotion(&mut sink))
            .await
            .unwrap_or_else(|e| {
                error!("Capture task failed: {}", e);
                EmotionLabel::fallback()
            });
        events.send(AppEvent::EmotionDetected(emotion.clone()));

        let tracks = services
            .tracks
            .tracks_by_emotion(&emotion, services.track_limit)
            .await;
        let covers = services.covers.load_all(&tracks).await;

        let loaded = tracks
            .into_iter()
            .zip(covers)
            .map(|(track, cover)| LoadedTrack { track, cover })
            .collect();
        events.send(AppEvent::TracksLoaded(loaded));
    })
}

/// Look up a YouTube video and post the result
pub fn spawn_video_lookup(
    runtime: &Handle,
    resolver: Arc<dyn VideoResolver>,
    query: String,
    events: EventSender,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let url = resolver.resolve_video_url(&query).await;
        events.send(AppEvent::VideoResolved(url));
    })
}
