use bytemuck::{Pod, Zeroable};
use serde::Serialize;

/// Identifier of a spawned falling letter. Unique for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LetterId(pub u32);

/// Screens of the game. Only `Playing` keeps the frame loop scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    Idle,
    Playing,
    Listening,
    GameOver,
}

impl GameState {
    /// Numeric code used in `GameEvent` payloads.
    pub fn code(self) -> f32 {
        match self {
            GameState::Idle => 0.0,
            GameState::Playing => 1.0,
            GameState::Listening => 2.0,
            GameState::GameOver => 3.0,
        }
    }
}

/// A sound event emitted by the game logic.
/// The numeric value maps to a synthesized sound in the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    pub const COLLECT: SoundEvent = SoundEvent(1);
    pub const SUCCESS: SoundEvent = SoundEvent(2);
    pub const GAME_OVER: SoundEvent = SoundEvent(3);
}

/// A numeric game event read by the presentation layer after each frame.
/// `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    /// `a` = new state code, `b` = previous state code.
    pub const STATE_CHANGED: f32 = 1.0;
    /// `a` = score, `b` = points just awarded.
    pub const SCORE_CHANGED: f32 = 2.0;
    /// `a` = collected char code, `b` = collected count, `c` = word length.
    pub const LETTER_COLLECTED: f32 = 3.0;

    pub fn state_changed(to: GameState, from: GameState) -> Self {
        Self { kind: Self::STATE_CHANGED, a: to.code(), b: from.code(), c: 0.0 }
    }

    pub fn score_changed(score: u32, delta: u32) -> Self {
        Self { kind: Self::SCORE_CHANGED, a: score as f32, b: delta as f32, c: 0.0 }
    }

    pub fn letter_collected(ch: char, collected: usize, word_len: usize) -> Self {
        Self {
            kind: Self::LETTER_COLLECTED,
            a: ch as u32 as f32,
            b: collected as f32,
            c: word_len as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
    }

    #[test]
    fn letter_event_carries_char_code() {
        let ev = GameEvent::letter_collected('C', 1, 3);
        assert_eq!(ev.kind, GameEvent::LETTER_COLLECTED);
        assert_eq!(ev.a, 67.0);
        assert_eq!(ev.c, 3.0);
    }
}
