use thiserror::Error;

/// Failures surfaced by the speech gate. All are recoverable: the game stays
/// in `Listening` and the player may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("Speech recognition is not supported in this browser. Try using Chrome or Edge.")]
    Unsupported,
    #[error("Microphone access was denied by the user.")]
    PermissionDenied,
    #[error("Could not access the microphone. Ensure it is connected and not blocked.")]
    CaptureUnavailable,
    #[error("No speech was detected. Please try speaking again.")]
    NoSpeechDetected,
    #[error("A network error occurred during speech recognition.")]
    NetworkError,
    #[error("The speech recognition service is not allowed.")]
    ServiceDisallowed,
    #[error("Speech recognition error: Bad grammar provided.")]
    GrammarError,
    #[error("Speech recognition error: The language is not supported.")]
    UnsupportedLanguage,
    #[error("No attempts remaining for this word.")]
    AttemptsExhausted,
    #[error("Speech recognition error: {0}")]
    Unknown(String),
}

impl SpeechError {
    /// Classify a recognizer error code (`SpeechRecognitionErrorEvent.error`).
    /// Returns `None` for `aborted`, which is a cancellation rather than a failure.
    pub fn from_code(code: &str) -> Option<SpeechError> {
        let err = match code {
            "aborted" => return None,
            "no-speech" => SpeechError::NoSpeechDetected,
            "audio-capture" => SpeechError::CaptureUnavailable,
            "not-allowed" => SpeechError::PermissionDenied,
            "network" => SpeechError::NetworkError,
            "service-not-allowed" => SpeechError::ServiceDisallowed,
            "bad-grammar" => SpeechError::GrammarError,
            "language-not-supported" => SpeechError::UnsupportedLanguage,
            other => SpeechError::Unknown(other.to_string()),
        };
        Some(err)
    }
}
