//! Webcam emotion capture
//!
//! Reads frames from the camera, classifies each one and hands the annotated
//! frame to a sink until the user confirms. The call blocks for the whole
//! session, so callers run it on a blocking worker.

use image::RgbImage;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::EmotionLabel;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no camera backend available (build with the `webcam` feature)")]
    DeviceUnavailable,

    #[error("camera error: {0}")]
    Device(String),

    #[error("emotion model not loaded")]
    ClassifierUnavailable,

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("no face detected")]
    NoFace,
}

/// An open camera; dropping it releases the device
pub trait Camera {
    fn read_frame(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Opens cameras by index
pub trait CameraOpener: Send + Sync {
    fn open(&self, index: u32) -> Result<Box<dyn Camera>, CaptureError>;
}

/// Estimates the dominant emotion of a single frame
pub trait EmotionClassifier: Send {
    fn classify(&mut self, frame: &RgbImage) -> Result<EmotionLabel, CaptureError>;
}

/// Feedback drawn over a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Emotion(EmotionLabel),
    NoFace,
}

impl Overlay {
    pub fn text(&self) -> String {
        match self {
            Overlay::Emotion(label) => format!("Emotion: {}", label),
            Overlay::NoFace => "No face detected".to_string(),
        }
    }
}

/// Where annotated frames go, and where the confirmation comes from
pub trait FrameSink {
    fn present(&mut self, frame: RgbImage, overlay: Overlay);

    /// True once the user confirmed the current emotion
    fn confirmed(&mut self) -> bool;

    /// Called once when capture ends, whatever the reason
    fn finish(&mut self) {}
}

/// Runs one capture session
#[derive(Clone)]
pub struct EmotionCapture {
    opener: Arc<dyn CameraOpener>,
    classifier: Arc<Mutex<Box<dyn EmotionClassifier>>>,
    camera_index: u32,
}

impl EmotionCapture {
    pub fn new(
        opener: Arc<dyn CameraOpener>,
        classifier: Box<dyn EmotionClassifier>,
        camera_index: u32,
    ) -> Self {
        Self {
            opener,
            classifier: Arc::new(Mutex::new(classifier)),
            camera_index,
        }
    }

    /// Capture until confirmed and return the last recognised emotion.
    ///
    /// Falls back to "neutral" when the camera cannot be opened or no frame
    /// was ever classified.
    pub fn detect_emotion(&self, sink: &mut dyn FrameSink) -> EmotionLabel {
        let mut detected = EmotionLabel::fallback();

        let mut camera = match self.opener.open(self.camera_index) {
            Ok(camera) => camera,
            Err(e) => {
                warn!("Could not open camera {}: {}", self.camera_index, e);
                sink.finish();
                return detected;
            }
        };
        info!("Camera {} opened, waiting for confirmation", self.camera_index);

        let mut classifier = self.classifier.lock();
        loop {
            let frame = match camera.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Camera stopped delivering frames: {}", e);
                    break;
                }
            };

            let overlay = match classifier.classify(&frame) {
                Ok(label) => {
                    detected = label.clone();
                    Overlay::Emotion(label)
                }
                Err(e) => {
                    debug!("Frame not classified: {}", e);
                    Overlay::NoFace
                }
            };

            sink.present(frame, overlay);
            if sink.confirmed() {
                break;
            }
        }

        drop(camera);
        sink.finish();
        info!("Emotion confirmed: {}", detected);
        detected
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::sync::atomic::Ordering;

    fn capture(opener: Arc<ScriptedOpener>, results: Vec<Option<&'static str>>) -> EmotionCapture {
        EmotionCapture::new(opener, Box::new(ScriptedClassifier(results.into())), 0)
    }

    #[test]
    fn test_open_failure_returns_fallback() {
        let opener = ScriptedOpener::new(None);
        let mut sink = RecordingSink::default();

        let label = capture(opener, vec![Some("happy")]).detect_emotion(&mut sink);

        assert_eq!(label.as_str(), "neutral");
        assert!(sink.overlays.is_empty());
        assert!(sink.finished);
    }

    #[test]
    fn test_confirmation_returns_last_label() {
        let opener = ScriptedOpener::new(Some(10));
        let mut sink = RecordingSink {
            confirm_after: Some(3),
            ..Default::default()
        };

        let label = capture(opener.clone(), vec![Some("sad"), Some("happy"), Some("angry")])
            .detect_emotion(&mut sink);

        assert_eq!(label.as_str(), "angry");
        assert_eq!(sink.overlays.len(), 3);
        assert!(opener.released.load(Ordering::SeqCst));
        assert!(sink.finished);
    }

    #[test]
    fn test_failed_frames_keep_previous_label() {
        let opener = ScriptedOpener::new(Some(10));
        let mut sink = RecordingSink {
            confirm_after: Some(3),
            ..Default::default()
        };

        let label =
            capture(opener, vec![Some("surprise"), None, None]).detect_emotion(&mut sink);

        assert_eq!(label.as_str(), "surprise");
        assert_eq!(
            sink.overlays,
            vec![
                Overlay::Emotion(EmotionLabel::new("surprise")),
                Overlay::NoFace,
                Overlay::NoFace
            ]
        );
    }

    #[test]
    fn test_no_face_ever_returns_fallback() {
        let opener = ScriptedOpener::new(Some(5));
        let mut sink = RecordingSink {
            confirm_after: Some(2),
            ..Default::default()
        };

        let label = capture(opener, vec![None, None]).detect_emotion(&mut sink);

        assert_eq!(label, EmotionLabel::fallback());
        assert_eq!(sink.overlays[0].text(), "No face detected");
    }

    #[test]
    fn test_frame_read_failure_ends_capture() {
        let opener = ScriptedOpener::new(Some(2));
        let mut sink = RecordingSink::default();

        let label = capture(opener.clone(), vec![Some("happy"), None]).detect_emotion(&mut sink);

        assert_eq!(label.as_str(), "happy");
        assert_eq!(sink.overlays.len(), 2);
        assert!(opener.released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_overlay_text() {
        assert_eq!(
            Overlay::Emotion(EmotionLabel::new("happy")).text(),
            "Emotion: happy"
        );
    }
}
