use crate::speech::error::SpeechError;
use crate::speech::normalize_transcript;
use crate::speech::recognizer::{
    RecognitionEvent, RecognitionId, RecognitionOutcome, RecognizerConfig, SpeechRecognizer,
};

/// What an accepted recognition event means to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// A normalized transcript was published. The attempt counts.
    Heard(String),
    /// Recognition failed. The attempt was refunded.
    Failed(SpeechError),
    /// Recognition ended with nothing heard. The attempt was refunded.
    Ended,
}

/// Single-flight wrapper around a [`SpeechRecognizer`].
///
/// Tracks the listening flag, the last normalized transcript, the last error
/// and the attempt counter. An attempt is counted on start and refunded if
/// the operation ends without a transcript, so `attempts` only ever reflects
/// evaluated utterances and never exceeds `max_attempts`.
pub struct SpeechGate {
    recognizer: Box<dyn SpeechRecognizer>,
    language: String,
    grammar_hints: bool,
    max_attempts: u32,
    attempts: u32,
    active: Option<RecognitionId>,
    next_id: u64,
    transcript: Option<String>,
    error: Option<SpeechError>,
}

impl SpeechGate {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        language: impl Into<String>,
        grammar_hints: bool,
        max_attempts: u32,
    ) -> Self {
        Self {
            recognizer,
            language: language.into(),
            grammar_hints,
            max_attempts,
            attempts: 0,
            active: None,
            next_id: 1,
            transcript: None,
            error: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    pub fn is_listening(&self) -> bool {
        self.active.is_some()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn attempts_left(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn error(&self) -> Option<&SpeechError> {
        self.error.as_ref()
    }

    /// Begin a recognition operation for `expected`.
    ///
    /// Any operation still in flight is cancelled first and its id retired,
    /// so a late completion from it can never be observed after this returns.
    pub fn start_listening(&mut self, expected: &str) -> Result<RecognitionId, SpeechError> {
        if !self.recognizer.is_supported() {
            self.error = Some(SpeechError::Unsupported);
            return Err(SpeechError::Unsupported);
        }
        self.cancel_active();
        if self.attempts >= self.max_attempts {
            return Err(SpeechError::AttemptsExhausted);
        }

        let id = RecognitionId(self.next_id);
        self.next_id += 1;

        let mut config = RecognizerConfig::new(self.language.clone());
        if self.grammar_hints && !expected.is_empty() {
            config = config.with_hints(&[expected]);
        }

        if let Err(err) = self.recognizer.start(id, &config) {
            log::warn!("speech: start failed: {}", err);
            self.error = Some(err.clone());
            return Err(err);
        }

        self.active = Some(id);
        self.attempts += 1;
        self.transcript = None;
        self.error = None;
        Ok(id)
    }

    /// Cancel the active operation, if any. Idempotent.
    pub fn stop_listening(&mut self) {
        self.cancel_active();
    }

    fn cancel_active(&mut self) {
        if let Some(id) = self.active.take() {
            self.recognizer.stop(id);
            self.refund();
        }
    }

    fn refund(&mut self) {
        self.attempts = self.attempts.saturating_sub(1);
    }

    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
    }

    /// Feed a completion from the recognizer. Stale events return `None`.
    pub fn accept(&mut self, event: RecognitionEvent) -> Option<GateOutcome> {
        if self.active != Some(event.id) {
            log::debug!("speech: dropping stale completion for {:?}", event.id);
            return None;
        }
        self.active = None;

        let outcome = match event.outcome {
            RecognitionOutcome::Transcript(raw) => {
                let cleaned = normalize_transcript(&raw);
                log::debug!("speech: heard {:?} -> {:?}", raw, cleaned);
                self.transcript = Some(cleaned.clone());
                GateOutcome::Heard(cleaned)
            }
            RecognitionOutcome::Failed(err) => {
                self.refund();
                self.error = Some(err.clone());
                GateOutcome::Failed(err)
            }
            RecognitionOutcome::Ended => {
                self.refund();
                GateOutcome::Ended
            }
        };
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::recognizer::testing::FakeRecognizer;

    fn gate(rec: &FakeRecognizer) -> SpeechGate {
        SpeechGate::new(Box::new(rec.clone()), "en-US", true, 3)
    }

    #[test]
    fn start_counts_attempt_and_listens() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        let id = g.start_listening("CAT").unwrap();
        assert!(g.is_listening());
        assert_eq!(g.attempts(), 1);
        let log = rec.log.borrow();
        assert_eq!(log.starts[0].0, id);
        assert_eq!(log.starts[0].1.language, "en-US");
        assert_eq!(log.starts[0].1.hints, vec!["CAT".to_string()]);
        assert_eq!(log.starts[0].1.max_alternatives, 1);
    }

    #[test]
    fn transcript_is_normalized() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        let id = g.start_listening("CAT").unwrap();
        let out = g.accept(RecognitionEvent::transcript(id, "Cat.")).unwrap();
        assert_eq!(out, GateOutcome::Heard("CAT".into()));
        assert_eq!(g.transcript(), Some("CAT"));
        assert!(!g.is_listening());
        assert_eq!(g.attempts(), 1);
    }

    #[test]
    fn unsupported_does_nothing() {
        let rec = FakeRecognizer::unsupported();
        let mut g = gate(&rec);
        assert_eq!(g.start_listening("CAT"), Err(SpeechError::Unsupported));
        assert!(!g.is_listening());
        assert_eq!(g.attempts(), 0);
        assert_eq!(g.error(), Some(&SpeechError::Unsupported));
        assert_eq!(rec.start_count(), 0);
    }

    #[test]
    fn restart_cancels_previous_and_drops_its_result() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        let first = g.start_listening("CAT").unwrap();
        let second = g.start_listening("CAT").unwrap();
        assert_ne!(first, second);
        assert_eq!(rec.log.borrow().stops, vec![first]);
        // The cancelled operation was refunded, so only one attempt is spent.
        assert_eq!(g.attempts(), 1);
        assert!(g.accept(RecognitionEvent::transcript(first, "dog")).is_none());
        assert!(g.is_listening());
        assert!(g.accept(RecognitionEvent::transcript(second, "cat")).is_some());
    }

    #[test]
    fn failure_reports_error_and_refunds() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        let id = g.start_listening("CAT").unwrap();
        let err = SpeechError::from_code("not-allowed").unwrap();
        let out = g.accept(RecognitionEvent::failed(id, err)).unwrap();
        assert_eq!(out, GateOutcome::Failed(SpeechError::PermissionDenied));
        assert!(!g.is_listening());
        assert_eq!(g.attempts(), 0);
        assert_eq!(g.error(), Some(&SpeechError::PermissionDenied));
    }

    #[test]
    fn end_after_result_is_stale() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        let id = g.start_listening("CAT").unwrap();
        g.accept(RecognitionEvent::transcript(id, "cat"));
        assert!(g.accept(RecognitionEvent::ended(id)).is_none());
        assert_eq!(g.attempts(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        g.stop_listening();
        let id = g.start_listening("CAT").unwrap();
        g.stop_listening();
        g.stop_listening();
        assert_eq!(rec.log.borrow().stops, vec![id]);
        assert!(!g.is_listening());
        assert_eq!(g.attempts(), 0);
    }

    #[test]
    fn new_start_clears_transcript_and_error() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        let id = g.start_listening("CAT").unwrap();
        g.accept(RecognitionEvent::failed(id, SpeechError::NetworkError));
        let id = g.start_listening("CAT").unwrap();
        g.accept(RecognitionEvent::transcript(id, "dog"));
        g.start_listening("CAT").unwrap();
        assert_eq!(g.transcript(), None);
        assert_eq!(g.error(), None);
    }

    #[test]
    fn exhausted_attempts_refuse_start() {
        let rec = FakeRecognizer::new();
        let mut g = gate(&rec);
        for _ in 0..3 {
            let id = g.start_listening("CAT").unwrap();
            g.accept(RecognitionEvent::transcript(id, "dog"));
        }
        assert_eq!(g.start_listening("CAT"), Err(SpeechError::AttemptsExhausted));
        g.reset_attempts();
        assert!(g.start_listening("CAT").is_ok());
    }

    #[test]
    fn hints_can_be_disabled() {
        let rec = FakeRecognizer::new();
        let mut g = SpeechGate::new(Box::new(rec.clone()), "es-MX", false, 3);
        g.start_listening("CAT").unwrap();
        let log = rec.log.borrow();
        assert!(log.starts[0].1.hints.is_empty());
        assert_eq!(log.starts[0].1.language, "es-MX");
    }

    #[test]
    fn start_error_is_published() {
        let mut rec = FakeRecognizer::new();
        rec.start_error = Some(SpeechError::ServiceDisallowed);
        let mut g = gate(&rec);
        assert_eq!(g.start_listening("CAT"), Err(SpeechError::ServiceDisallowed));
        assert_eq!(g.attempts(), 0);
        assert_eq!(g.error(), Some(&SpeechError::ServiceDisallowed));
    }
}
