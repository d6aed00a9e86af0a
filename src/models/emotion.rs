//! Emotion labels produced by the webcam capture

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used whenever nothing better is known
pub const FALLBACK_EMOTION: &str = "neutral";

/// A detected facial emotion, e.g. "happy" or "sad".
///
/// Always lower-case and never empty. Labels outside the known vocabulary are
/// kept as-is; the genre mapper decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EmotionLabel(String);

impl EmotionLabel {
    pub fn new(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            Self::fallback()
        } else {
            Self(label)
        }
    }

    pub fn fallback() -> Self {
        Self(FALLBACK_EMOTION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EmotionLabel {
    fn default() -> Self {
        Self::fallback()
    }
}

impl From<String> for EmotionLabel {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<EmotionLabel> for String {
    fn from(label: EmotionLabel) -> Self {
        label.0
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
