use serde::Serialize;

use crate::api::types::{GameEvent, SoundEvent};

/// Player-facing messages, shown by the presentation layer as toasts.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    WordComplete { word: String, attempts_left: u32 },
    Correct { word: String },
    TryAgain { heard: String, expected: String, attempts_left: u32 },
    GameOver { word: String, score: u32, new_high_score: bool },
    SpeechUnsupported,
    SpeechError { message: String },
}

/// Toast styling hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastVariant {
    Default,
    Success,
    Destructive,
}

/// Serialized form of a [`Notice`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Notice {
    pub fn to_toast(&self) -> Toast {
        let (title, description, variant) = match self {
            Notice::WordComplete { word, attempts_left } => (
                "Word Complete!",
                format!("Speak \"{}\" ({} attempts left)", word, attempts_left),
                ToastVariant::Default,
            ),
            Notice::Correct { word } => (
                "Correct!",
                format!("You spelled \"{}\"", word),
                ToastVariant::Success,
            ),
            Notice::TryAgain { heard, expected, attempts_left } => (
                "Try Again!",
                format!(
                    "You said \"{}\", expected \"{}\" ({} attempts left)",
                    heard, expected, attempts_left
                ),
                ToastVariant::Destructive,
            ),
            Notice::GameOver { word, score, new_high_score } => {
                let mut description = format!("Out of attempts. The word was \"{}\"", word);
                if *new_high_score {
                    description.push_str(&format!(". New high score: {}!", score));
                }
                ("Game Over!", description, ToastVariant::Destructive)
            }
            Notice::SpeechUnsupported => (
                "Speech Not Supported",
                "Your browser doesn't support speech recognition.".to_string(),
                ToastVariant::Destructive,
            ),
            Notice::SpeechError { message } => {
                ("Microphone Problem", message.clone(), ToastVariant::Destructive)
            }
        };
        Toast { title: title.to_string(), description, variant }
    }
}

/// Everything the game emits for the presentation layer between reads.
#[derive(Debug, Default)]
pub struct Outbox {
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    pub notices: Vec<Notice>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_sound(&mut self, sound: SoundEvent) {
        self.sounds.push(sound);
    }

    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn clear(&mut self) {
        self.sounds.clear();
        self.events.clear();
        self.notices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_again_toast_names_both_words() {
        let toast = Notice::TryAgain {
            heard: "DOG".into(),
            expected: "CAT".into(),
            attempts_left: 2,
        }
        .to_toast();
        assert_eq!(toast.title, "Try Again!");
        assert_eq!(toast.description, "You said \"DOG\", expected \"CAT\" (2 attempts left)");
        assert_eq!(toast.variant, ToastVariant::Destructive);
    }

    #[test]
    fn toast_serializes_camel_case_variant() {
        let toast = Notice::Correct { word: "CAT".into() }.to_toast();
        let json = serde_json::to_string(&toast).unwrap();
        assert!(json.contains("\"variant\":\"success\""), "{}", json);
    }

    #[test]
    fn take_drains() {
        let mut out = Outbox::new();
        out.emit_sound(SoundEvent::COLLECT);
        out.notify(Notice::SpeechUnsupported);
        assert_eq!(out.take_sounds(), vec![SoundEvent::COLLECT]);
        assert!(out.sounds.is_empty());
        assert_eq!(out.take_notices().len(), 1);
        assert!(out.notices.is_empty());
    }
}
