//! Speech verification: the recognizer capability contract and the gate
//! that tracks attempts, transcripts and errors around it.

pub mod error;
pub mod gate;
pub mod recognizer;

/// Characters stripped from a raw recognition result.
const STRIPPED_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// Normalize raw recognizer text: trim, drop `. , ! ? ; :`, uppercase.
/// Nothing else is forgiven; extra words or spelling variants still mismatch.
pub fn normalize_transcript(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .to_uppercase()
}
