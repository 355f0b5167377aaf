use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::Rng;

/// A target word and the hint shown while collecting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Uppercase ASCII letters only.
    pub word: String,
    pub hint: String,
}

impl WordEntry {
    pub fn new(word: &str, hint: &str) -> Self {
        Self { word: word.to_string(), hint: hint.to_string() }
    }

    /// Number of letters to collect.
    pub fn len(&self) -> usize {
        self.word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// The letter at `index`, if any.
    pub fn letter(&self, index: usize) -> Option<char> {
        self.word.as_bytes().get(index).map(|b| *b as char)
    }
}

#[derive(Debug, Error)]
pub enum WordBankError {
    #[error("invalid word list JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("word list has no levels")]
    EmptyBank,
    #[error("level {0} has no words")]
    EmptyLevel(usize),
    #[error("word {0:?} must be uppercase ASCII letters")]
    InvalidWord(String),
}

/// Leveled table of target words. Level 0 is the easiest.
#[derive(Debug, Clone)]
pub struct WordBank {
    levels: Vec<Vec<WordEntry>>,
}

const STANDARD_LEVELS: [[(&str, &str); 3]; 5] = [
    [("CAT", "A furry pet"), ("DOG", "Man's best friend"), ("SUN", "Shines in the sky")],
    [("BIRD", "Flies in the sky"), ("FISH", "Lives in water"), ("TREE", "Grows in forests")],
    [("APPLE", "A fruit"), ("HOUSE", "A place to live"), ("WATER", "Essential for life")],
    [("MONKEY", "A playful primate"), ("DRAGON", "Mythical creature"), ("PLANET", "Celestial body")],
    [("ELEPHANT", "Large gray animal"), ("COMPUTER", "Electronic device"), ("DINOSAUR", "Extinct creature")],
];

impl WordBank {
    /// The built-in five-level table.
    pub fn standard() -> Self {
        let levels = STANDARD_LEVELS
            .iter()
            .map(|level| level.iter().map(|(w, h)| WordEntry::new(w, h)).collect())
            .collect();
        Self { levels }
    }

    /// Build a bank from explicit levels, rejecting empty levels and non-letter words.
    pub fn from_levels(levels: Vec<Vec<WordEntry>>) -> Result<Self, WordBankError> {
        if levels.is_empty() {
            return Err(WordBankError::EmptyBank);
        }
        for (idx, level) in levels.iter().enumerate() {
            if level.is_empty() {
                return Err(WordBankError::EmptyLevel(idx));
            }
            if let Some(bad) = level
                .iter()
                .find(|e| e.word.is_empty() || !e.word.bytes().all(|b| b.is_ascii_uppercase()))
            {
                return Err(WordBankError::InvalidWord(bad.word.clone()));
            }
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of levels: `[[{"word": "CAT", "hint": "..."}], ...]`.
    pub fn from_json(json: &str) -> Result<Self, WordBankError> {
        let levels: Vec<Vec<WordEntry>> = serde_json::from_str(json)?;
        Self::from_levels(levels)
    }

    /// Highest valid level index.
    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn clamp_level(&self, level: usize) -> usize {
        level.min(self.max_level())
    }

    pub fn level(&self, level: usize) -> &[WordEntry] {
        &self.levels[self.clamp_level(level)]
    }

    /// Uniformly random entry from `level`, clamped to the table.
    pub fn random_word(&self, level: usize, rng: &mut Rng) -> &WordEntry {
        let words = self.level(level);
        &words[rng.next_index(words.len())]
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::standard()
    }
}
