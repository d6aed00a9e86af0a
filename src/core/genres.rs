//! Emotion to Spotify seed genre mapping

use crate::models::EmotionLabel;

/// Genre used for emotions missing from the table
pub const DEFAULT_GENRE: &str = "pop";

/// Seed genres per emotion, most representative first.
///
/// "fear" and "disgust" are intentionally absent and use the default.
const EMOTION_GENRES: &[(&str, &[&str])] = &[
    ("happy", &["pop", "dance", "party"]),
    ("sad", &["acoustic", "piano", "singer-songwriter"]),
    ("angry", &["metal", "rock", "hardcore"]),
    ("surprise", &["electronic", "indie", "alternative"]),
    ("neutral", &["chill", "ambient", "classical"]),
];

/// Ordered seed genres for an emotion
pub fn genres_for(emotion: &EmotionLabel) -> &'static [&'static str] {
    let key = emotion.as_str().trim().to_lowercase();

    EMOTION_GENRES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, genres)| *genres)
        .unwrap_or(&[DEFAULT_GENRE])
}

/// The genre used to seed recommendations
pub fn seed_genre(emotion: &EmotionLabel) -> &'static str {
    genres_for(emotion).first().copied().unwrap_or(DEFAULT_GENRE)
}
