//! ONNX facial emotion classifier
//!
//! Expects a FER+ style model: one 1×1×64×64 grayscale input (0–255) and
//! eight raw scores. The centre square of the frame is classified; there is
//! no separate face detector, so low-confidence frames count as "no face".

use image::imageops::{self, FilterType};
use image::RgbImage;
use std::path::Path;
use tracing::{info, warn};

use crate::core::{CaptureError, EmotionClassifier};
use crate::models::EmotionLabel;

/// Model input edge length
#[cfg_attr(not(feature = "webcam"), allow(dead_code))]
pub const INPUT_SIZE: u32 = 64;

/// Output order of the FER+ model, using the app's label names
#[cfg_attr(not(feature = "webcam"), allow(dead_code))]
pub const MODEL_LABELS: [&str; 8] = [
    "neutral", "happy", "surprise", "sad", "angry", "disgust", "fear", "contempt",
];

/// Classifier used when no model could be loaded; every frame fails
#[derive(Debug, Default)]
pub struct UnavailableClassifier;

impl EmotionClassifier for UnavailableClassifier {
    fn classify(&mut self, _frame: &RgbImage) -> Result<EmotionLabel, CaptureError> {
        Err(CaptureError::ClassifierUnavailable)
    }
}

/// Load the emotion model, or a classifier that always fails
pub fn load_classifier(model_path: &Path, min_confidence: f32) -> Box<dyn EmotionClassifier> {
    match open_model(model_path, min_confidence) {
        Ok(classifier) => {
            info!("Loaded emotion model from {:?}", model_path);
            classifier
        }
        Err(e) => {
            warn!(
                "Emotion model unavailable ({}); every frame will show \"No face detected\"",
                e
            );
            Box::new(UnavailableClassifier)
        }
    }
}

#[cfg(feature = "webcam")]
fn open_model(
    model_path: &Path,
    min_confidence: f32,
) -> Result<Box<dyn EmotionClassifier>, CaptureError> {
    Ok(Box::new(onnx::OnnxEmotionClassifier::load(
        model_path,
        min_confidence,
    )?))
}

#[cfg(not(feature = "webcam"))]
fn open_model(
    _model_path: &Path,
    _min_confidence: f32,
) -> Result<Box<dyn EmotionClassifier>, CaptureError> {
    Err(CaptureError::ClassifierUnavailable)
}

/// Grayscale centre crop scaled to the model input, row-major
#[cfg_attr(not(feature = "webcam"), allow(dead_code))]
pub fn preprocess(frame: &RgbImage) -> Result<Vec<f32>, CaptureError> {
    let (width, height) = frame.dimensions();
    let side = width.min(height);
    if side == 0 {
        return Err(CaptureError::Classification("empty frame".to_string()));
    }

    let square = imageops::crop_imm(frame, (width - side) / 2, (height - side) / 2, side, side)
        .to_image();
    let gray = imageops::grayscale(&square);
    let scaled = imageops::resize(&gray, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    Ok(scaled.pixels().map(|p| f32::from(p.0[0])).collect())
}

#[cfg_attr(not(feature = "webcam"), allow(dead_code))]
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Dominant emotion from raw model scores
#[cfg_attr(not(feature = "webcam"), allow(dead_code))]
pub fn dominant_emotion(scores: &[f32], min_confidence: f32) -> Result<EmotionLabel, CaptureError> {
    if scores.len() != MODEL_LABELS.len() {
        return Err(CaptureError::Classification(format!(
            "expected {} scores, got {}",
            MODEL_LABELS.len(),
            scores.len()
        )));
    }

    let probs = softmax(scores);
    let (index, confidence) = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or(CaptureError::NoFace)?;

    if confidence.is_nan() || confidence < min_confidence {
        return Err(CaptureError::NoFace);
    }

    Ok(EmotionLabel::new(MODEL_LABELS[index]))
}

#[cfg(feature = "webcam")]
mod onnx {
    use image::RgbImage;
    use ort::session::Session;
    use ort::value::Tensor;
    use std::path::Path;

    use super::{dominant_emotion, preprocess, INPUT_SIZE};
    use crate::core::{CaptureError, EmotionClassifier};
    use crate::models::EmotionLabel;

    fn model_error(e: ort::Error) -> CaptureError {
        CaptureError::Classification(e.to_string())
    }

    pub struct OnnxEmotionClassifier {
        session: Session,
        input_name: String,
        min_confidence: f32,
    }

    impl OnnxEmotionClassifier {
        pub fn load(model_path: &Path, min_confidence: f32) -> Result<Self, CaptureError> {
            if !model_path.exists() {
                return Err(CaptureError::Classification(format!(
                    "model not found: {:?}",
                    model_path
                )));
            }

            let session = Session::builder()
                .and_then(|b| b.with_intra_threads(1))
                .and_then(|b| b.commit_from_file(model_path))
                .map_err(model_error)?;

            let input_name = session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| CaptureError::Classification("model has no inputs".to_string()))?;

            Ok(Self {
                session,
                input_name,
                min_confidence,
            })
        }
    }

    impl EmotionClassifier for OnnxEmotionClassifier {
        fn classify(&mut self, frame: &RgbImage) -> Result<EmotionLabel, CaptureError> {
            let pixels = preprocess(frame)?;
            let side = INPUT_SIZE as usize;
            let input = Tensor::from_array(([1usize, 1, side, side], pixels)).map_err(model_error)?;

            let outputs = self
                .session
                .run(ort::inputs![self.input_name.as_str() => input])
                .map_err(model_error)?;

            let (_, scores) = outputs
                .iter()
                .next()
                .ok_or_else(|| CaptureError::Classification("model produced no output".to_string()))?;
            let (_shape, scores) = scores.try_extract_tensor::<f32>().map_err(model_error)?;

            dominant_emotion(scores, self.min_confidence)
        }
    }
}
