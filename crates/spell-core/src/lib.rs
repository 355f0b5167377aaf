pub mod api;
pub mod core;
pub mod input;
pub mod speech;
pub mod systems;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use api::config::{GameConfig, ConfigError};
pub use api::game::SpellRacer;
pub use api::outbox::{Outbox, Notice, Toast, ToastVariant};
pub use api::snapshot::HudSnapshot;
pub use api::types::{GameState, LetterId, SoundEvent, GameEvent};
pub use crate::core::rng::Rng;
pub use crate::core::storage::{ScoreStore, MemoryStore, HighScore};
pub use crate::core::time::{FixedTimestep, FrameClock};
pub use crate::core::words::{WordBank, WordEntry, WordBankError};
pub use input::controls::{Command, Controls, InputEvent, Key};
pub use speech::error::SpeechError;
pub use speech::gate::{GateOutcome, SpeechGate};
pub use speech::recognizer::{
    RecognitionEvent, RecognitionId, RecognitionOutcome, RecognizerConfig, SpeechRecognizer,
    UnsupportedRecognizer,
};
pub use speech::normalize_transcript;
pub use systems::play::{FallingLetter, PlayField, Player, Rect, TickOutcome};
pub use systems::render::build_render_buffer;
pub use renderer::instance::{RenderInstance, RenderBuffer};
