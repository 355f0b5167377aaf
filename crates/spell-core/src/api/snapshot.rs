use serde::Serialize;

use crate::api::types::GameState;

/// Read-only view of the session for HUD rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    pub state: GameState,
    /// 1-based level for display.
    pub level: usize,
    pub score: u32,
    pub high_score: u32,
    pub word: String,
    pub hint: String,
    /// Letters of `word` collected so far.
    pub collected: usize,
    /// One flag per letter of `word`, set once that letter is collected.
    pub collected_mask: Vec<bool>,
    pub attempts_left: u32,
    pub listening: bool,
    pub transcript: Option<String>,
    pub error: Option<String>,
    pub speech_supported: bool,
    pub sound_enabled: bool,
}

impl HudSnapshot {
    /// Mask for a word of `len` letters whose first `collected` are gathered.
    pub fn letter_mask(len: usize, collected: usize) -> Vec<bool> {
        (0..len).map(|i| i < collected).collect()
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
