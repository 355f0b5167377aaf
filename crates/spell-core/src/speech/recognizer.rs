use crate::speech::error::SpeechError;

/// Identifies one recognition operation. Completions carrying an id other
/// than the gate's active one are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognitionId(pub u64);

/// Settings handed to the recognizer for each operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
    /// BCP 47 language tag.
    pub language: String,
    /// Words the recognizer should favour. Empty disables grammar hinting.
    pub hints: Vec<String>,
    /// Alternatives requested from the recognizer. Only the best is used.
    pub max_alternatives: u32,
}

impl RecognizerConfig {
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: language.into(), hints: Vec::new(), max_alternatives: 1 }
    }

    pub fn with_hints(mut self, hints: &[&str]) -> Self {
        self.hints = hints.iter().map(|h| h.to_string()).collect();
        self
    }

    /// JSGF grammar listing the hint words in lowercase, or `None` without hints.
    pub fn jsgf_grammar(&self) -> Option<String> {
        if self.hints.is_empty() {
            return None;
        }
        let words: Vec<String> = self.hints.iter().map(|w| w.to_lowercase()).collect();
        Some(format!("#JSGF V1.0; grammar words; public <word> = {} ;", words.join(" | ")))
    }
}

/// How a recognition operation finished.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// Raw best-alternative text, before normalization.
    Transcript(String),
    Failed(SpeechError),
    /// The operation ended without a result or error (silence, abort).
    Ended,
}

/// Asynchronous completion delivered back to the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionEvent {
    pub id: RecognitionId,
    pub outcome: RecognitionOutcome,
}

impl RecognitionEvent {
    pub fn transcript(id: RecognitionId, raw: impl Into<String>) -> Self {
        Self { id, outcome: RecognitionOutcome::Transcript(raw.into()) }
    }

    pub fn failed(id: RecognitionId, err: SpeechError) -> Self {
        Self { id, outcome: RecognitionOutcome::Failed(err) }
    }

    pub fn ended(id: RecognitionId) -> Self {
        Self { id, outcome: RecognitionOutcome::Ended }
    }
}

/// Speech-recognition capability consumed by the gate.
///
/// `start` only begins the operation; its result is delivered later as a
/// [`RecognitionEvent`] tagged with the same id. Implementations report
/// microphone failures (`PermissionDenied`, `CaptureUnavailable`) through that
/// event, not through the return value.
pub trait SpeechRecognizer {
    fn is_supported(&self) -> bool;

    fn start(&mut self, id: RecognitionId, config: &RecognizerConfig) -> Result<(), SpeechError>;

    /// Cancel operation `id`. Must be a no-op for ids that already finished.
    fn stop(&mut self, id: RecognitionId);
}

/// Recognizer for hosts without speech support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self, _id: RecognitionId, _config: &RecognizerConfig) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn stop(&mut self, _id: RecognitionId) {}
}
