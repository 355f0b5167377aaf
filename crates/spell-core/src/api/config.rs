use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game configuration. Every field has a default, so a partial JSON
/// object only overrides what it names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Play area width in game units.
    pub world_width: f32,
    /// Play area height in game units.
    pub world_height: f32,
    /// Left edge of the player rectangle. The player never moves horizontally.
    pub player_x: f32,
    /// Side length of the player's square.
    pub player_size: f32,
    /// Side length of a falling letter's square.
    pub letter_size: f32,
    /// Vertical distance per tick while an arrow key is held.
    pub player_speed: f32,
    /// Horizontal distance per tick a falling letter travels leftwards.
    pub letter_speed: f32,
    /// Evaluated speech attempts allowed per word before game over.
    pub max_attempts: u32,
    /// Points per collected letter.
    pub letter_points: u32,
    /// Points per correctly spoken word.
    pub word_points: u32,
    /// BCP 47 language tag handed to the speech recognizer.
    pub language: String,
    /// Pass the target word to the recognizer as a grammar hint.
    pub grammar_hints: bool,
    /// Key the high score is persisted under.
    pub storage_key: String,
    /// RNG seed. `None` lets the host pick one (the web bridge uses the clock).
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 320.0,
            world_height: 200.0,
            player_x: 30.0,
            player_size: 20.0,
            letter_size: 20.0,
            player_speed: 5.0,
            letter_speed: 1.5,
            max_attempts: 3,
            letter_points: 10,
            word_points: 50,
            language: "en-US".to_string(),
            grammar_hints: true,
            storage_key: "spellRacerHighScore".to_string(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid("fixedDt must be positive".into()));
        }
        if !(self.player_speed > 0.0 && self.letter_speed > 0.0) {
            return Err(ConfigError::Invalid("speeds must be positive".into()));
        }
        if !(self.player_size > 0.0 && self.letter_size > 0.0) {
            return Err(ConfigError::Invalid("sprite sizes must be positive".into()));
        }
        if self.world_height < self.player_size || self.world_height <= self.letter_size * 2.0 {
            return Err(ConfigError::Invalid(format!(
                "worldHeight {} is too small for the sprites",
                self.world_height
            )));
        }
        if self.world_width <= self.player_x + self.player_size {
            return Err(ConfigError::Invalid(format!(
                "worldWidth {} leaves no room right of the player",
                self.world_width
            )));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("maxAttempts must be at least 1".into()));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("language must not be empty".into()));
        }
        Ok(())
    }

    /// Lowest allowed player centre.
    pub fn player_min_y(&self) -> f32 {
        self.player_size / 2.0
    }

    /// Highest allowed player centre.
    pub fn player_max_y(&self) -> f32 {
        self.world_height - self.player_size / 2.0
    }

    pub fn clamp_player_y(&self, y: f32) -> f32 {
        y.max(self.player_min_y()).min(self.player_max_y())
    }
}
