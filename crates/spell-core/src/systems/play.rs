use glam::Vec2;

use crate::api::config::GameConfig;
use crate::api::types::LetterId;
use crate::core::rng::Rng;
use crate::core::words::WordEntry;
use crate::input::controls::Controls;

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Square of side `size` whose left edge is `left`, vertically centred on `center_y`.
    pub fn left_centered(left: f32, center_y: f32, size: f32) -> Self {
        Self {
            min: Vec2::new(left, center_y - size / 2.0),
            size: Vec2::splat(size),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap test. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max().x
            && self.max().x > other.min.x
            && self.min.y < other.max().y
            && self.max().y > other.min.y
    }
}

/// The player's sprite. Horizontal position is fixed by config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
}

/// The single letter currently travelling leftwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingLetter {
    pub id: LetterId,
    pub ch: char,
    pub x: f32,
    pub y: f32,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    pub spawned: Option<LetterId>,
    /// A letter left the screen uncollected.
    pub expired: bool,
    pub collected: Option<char>,
    /// The collected letters now spell the whole word.
    pub word_complete: bool,
}

/// Simulation state of the play area: player, at most one letter, and
/// the letters gathered so far (always a prefix of the target word).
#[derive(Debug, Clone)]
pub struct PlayField {
    pub player: Player,
    letter: Option<FallingLetter>,
    collected: String,
    next_letter_id: u32,
}

impl PlayField {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player: Player { x: config.player_x, y: config.world_height / 2.0 },
            letter: None,
            collected: String::new(),
            next_letter_id: 1,
        }
    }

    /// Back to the starting layout: centred player, empty field.
    pub fn reset(&mut self, config: &GameConfig) {
        self.player = Player { x: config.player_x, y: config.world_height / 2.0 };
        self.clear_word();
    }

    /// Drop the letter in flight and everything collected. The player stays put.
    pub fn clear_word(&mut self) {
        self.letter = None;
        self.collected.clear();
    }

    pub fn letter(&self) -> Option<&FallingLetter> {
        self.letter.as_ref()
    }

    pub fn collected(&self) -> &str {
        &self.collected
    }

    pub fn is_complete(&self, word: &WordEntry) -> bool {
        self.collected.len() == word.len()
    }

    pub fn player_rect(&self, config: &GameConfig) -> Rect {
        Rect::left_centered(self.player.x, self.player.y, config.player_size)
    }

    pub fn letter_rect(&self, config: &GameConfig) -> Option<Rect> {
        self.letter
            .as_ref()
            .map(|l| Rect::left_centered(l.x, l.y, config.letter_size))
    }

    /// Apply held keys or the pointer to the player, clamped to the play area.
    pub fn move_player(&mut self, controls: &Controls, config: &GameConfig) {
        let y = match controls.pointer_y() {
            Some(py) => py,
            None => {
                let mut y = self.player.y;
                if controls.up() {
                    y -= config.player_speed;
                }
                if controls.down() {
                    y += config.player_speed;
                }
                y
            }
        };
        self.player.y = config.clamp_player_y(y);
    }

    fn spawn(&mut self, ch: char, config: &GameConfig, rng: &mut Rng) -> LetterId {
        let id = LetterId(self.next_letter_id);
        self.next_letter_id += 1;
        let y = rng.range_f32(config.letter_size, config.world_height - config.letter_size);
        self.letter = Some(FallingLetter { id, ch, x: config.world_width, y });
        log::debug!("spawned {:?} '{}' at y={:.1}", id, ch, y);
        id
    }

    /// Advance the simulation by one tick.
    pub fn tick(
        &mut self,
        controls: &Controls,
        word: &WordEntry,
        config: &GameConfig,
        rng: &mut Rng,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        self.move_player(controls, config);

        if let Some(letter) = self.letter.as_mut() {
            letter.x -= config.letter_speed;
            if letter.x + config.letter_size < 0.0 {
                self.letter = None;
                outcome.expired = true;
            }
        }

        if self.letter.is_none() {
            if let Some(ch) = word.letter(self.collected.len()) {
                outcome.spawned = Some(self.spawn(ch, config, rng));
            }
        }

        let hit = match self.letter_rect(config) {
            Some(rect) => self.player_rect(config).overlaps(&rect),
            None => false,
        };
        if hit {
            if let Some(letter) = self.letter.take() {
                self.collected.push(letter.ch);
                outcome.collected = Some(letter.ch);
                outcome.word_complete = self.is_complete(word);
            }
        }

        outcome
    }
}
