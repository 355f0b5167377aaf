/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
}

impl Key {
    /// Map a DOM `keyCode`. Only the arrow keys steer the player.
    pub fn from_code(key_code: u32) -> Option<Key> {
        match key_code {
            38 => Some(Key::Up),
            40 => Some(Key::Down),
            _ => None,
        }
    }
}

/// Discrete commands from the UI layer (buttons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start from `Idle` or restart from `GameOver`.
    Start,
    ToggleMic,
    ToggleSound,
}

/// Input events the game understands, already mapped to game coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key },
    KeyUp { key: Key },
    /// Pointer or touch at vertical position `y` in world units.
    PointerMove { y: f32 },
    /// Pointer left the play area or the touch ended.
    PointerEnd,
    Command(Command),
}

/// Held-key and pointer state, sampled once per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Controls {
    up: bool,
    down: bool,
    pointer_y: Option<f32>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Up => self.up = true,
            Key::Down => self.down = true,
        }
    }

    pub fn release(&mut self, key: Key) {
        match key {
            Key::Up => self.up = false,
            Key::Down => self.down = false,
        }
    }

    pub fn point_at(&mut self, y: f32) {
        self.pointer_y = Some(y);
    }

    pub fn end_pointer(&mut self) {
        self.pointer_y = None;
    }

    pub fn up(&self) -> bool {
        self.up
    }

    pub fn down(&self) -> bool {
        self.down
    }

    /// Pointer position, which overrides held keys while present.
    pub fn pointer_y(&self) -> Option<f32> {
        self.pointer_y
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_codes_map_to_keys() {
        assert_eq!(Key::from_code(38), Some(Key::Up));
        assert_eq!(Key::from_code(40), Some(Key::Down));
        assert_eq!(Key::from_code(32), None);
    }

    #[test]
    fn press_and_release() {
        let mut c = Controls::new();
        c.press(Key::Up);
        c.press(Key::Down);
        assert!(c.up() && c.down());
        c.release(Key::Up);
        assert!(!c.up() && c.down());
    }

    #[test]
    fn pointer_is_cleared_on_end() {
        let mut c = Controls::new();
        c.point_at(64.0);
        assert_eq!(c.pointer_y(), Some(64.0));
        c.end_pointer();
        assert_eq!(c.pointer_y(), None);
    }
}
