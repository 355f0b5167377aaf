//! Browser bridge for Spell Racer.
//!
//! One [`GameRunner`] lives in thread-local storage. JavaScript drives it
//! through the `game_*` exports and reads render data, sounds, events, toasts
//! and the HUD snapshot back after each call. The crate owns the
//! `requestAnimationFrame` loop, which only runs while the game is playing.

pub mod recognizer;
pub mod runner;
pub mod scheduler;
pub mod storage;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use spell_core::{
    Command, GameConfig, InputEvent, Key, RecognitionEvent, SpellRacer, WordBank,
};
use wasm_bindgen::prelude::*;

pub use recognizer::WebSpeechRecognizer;
pub use runner::GameRunner;
pub use scheduler::FrameLoop;
pub use storage::LocalStorageStore;

thread_local! {
    static RUNNER: RefCell<Option<GameRunner>> = RefCell::new(None);
    static FRAMES: RefCell<Option<FrameLoop>> = RefCell::new(None);
    /// Completions that arrived while the runner was borrowed.
    static PENDING: RefCell<VecDeque<RecognitionEvent>> = RefCell::new(VecDeque::new());
}

/// Run `f` against the runner, first applying any queued recognition events.
/// Returns `None` before `game_init`.
fn with_runner<R>(f: impl FnOnce(&mut GameRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow.as_mut()?;
        while let Some(event) = PENDING.with(|q| q.borrow_mut().pop_front()) {
            runner.on_recognition(event);
        }
        Some(f(runner))
    })
}

/// Apply an input and restart the frame loop if the game resumed playing.
fn dispatch(event: InputEvent) -> Option<String> {
    let result = with_runner(|r| r.dispatch(event));
    ensure_frames();
    match result {
        Some(Err(err)) => Some(err.to_string()),
        _ => None,
    }
}

fn ensure_frames() {
    if with_runner(|r| r.wants_frames()).unwrap_or(false) {
        FRAMES.with(|cell| {
            if let Some(frames) = cell.borrow().as_ref() {
                frames.ensure_running();
            }
        });
    }
}

fn deliver_recognition(event: RecognitionEvent) {
    let applied = RUNNER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(runner) = slot.as_mut() {
                runner.on_recognition(event);
            }
            true
        }
        Err(_) => {
            PENDING.with(|q| q.borrow_mut().push_back(event));
            false
        }
    });
    // A queued event is applied by the current borrower's next `with_runner`,
    // and that caller restarts frames itself.
    if applied {
        ensure_frames();
    }
}

/// Create the game. `config_json` and `words_json` override the built-in
/// settings and word bank; invalid JSON is reported as an exception.
#[wasm_bindgen]
pub fn game_init(config_json: Option<String>, words_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let mut config = match config_json.as_deref() {
        Some(json) => GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => GameConfig::default(),
    };
    if config.seed.is_none() {
        config.seed = Some(js_sys::Date::now() as u64);
    }
    let bank = match words_json.as_deref() {
        Some(json) => WordBank::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => WordBank::standard(),
    };

    let recognizer = WebSpeechRecognizer::new(Rc::new(deliver_recognition));
    let game = SpellRacer::new(config, bank, Box::new(recognizer), Box::new(LocalStorageStore::new()));
    let speech = game.gate().is_supported();
    RUNNER.with(|cell| *cell.borrow_mut() = Some(GameRunner::new(game)));

    FRAMES.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(FrameLoop::new(|timestamp| {
                with_runner(|r| r.frame(timestamp)).unwrap_or(false)
            }));
        }
    });

    log::info!("spell-racer: initialized (speech recognition: {})", speech);
    Ok(())
}

// ---- Input ----

#[wasm_bindgen]
pub fn game_key_down(key_code: u32) {
    if let Some(key) = Key::from_code(key_code) {
        dispatch(InputEvent::KeyDown { key });
    }
}

#[wasm_bindgen]
pub fn game_key_up(key_code: u32) {
    if let Some(key) = Key::from_code(key_code) {
        dispatch(InputEvent::KeyUp { key });
    }
}

/// `y` in world units (the caller maps from canvas pixels).
#[wasm_bindgen]
pub fn game_pointer_move(y: f32) {
    dispatch(InputEvent::PointerMove { y });
}

#[wasm_bindgen]
pub fn game_pointer_end() {
    dispatch(InputEvent::PointerEnd);
}

#[wasm_bindgen]
pub fn game_start() {
    dispatch(InputEvent::Command(Command::Start));
}

/// Start or cancel listening. Returns an error message when listening could
/// not begin (for example, no speech support).
#[wasm_bindgen]
pub fn game_toggle_mic() -> Option<String> {
    dispatch(InputEvent::Command(Command::ToggleMic))
}

#[wasm_bindgen]
pub fn game_toggle_sound() {
    dispatch(InputEvent::Command(Command::ToggleSound));
}

// ---- Data accessors ----

/// HUD state as JSON.
#[wasm_bindgen]
pub fn game_snapshot() -> String {
    with_runner(|r| r.snapshot_json()).unwrap_or_default()
}

/// Toasts queued since the last call, as a JSON array.
#[wasm_bindgen]
pub fn game_take_toasts() -> String {
    with_runner(|r| r.take_toasts_json()).unwrap_or_else(|| "[]".to_string())
}

#[wasm_bindgen]
pub fn game_take_sounds() -> Vec<u32> {
    with_runner(|r| r.take_sounds()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn game_take_events() -> Vec<f32> {
    with_runner(|r| r.take_events()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_instances_ptr() -> *const f32 {
    with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    with_runner(|r| r.instance_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_world_width() -> f32 {
    with_runner(|r| r.world_width()).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_world_height() -> f32 {
    with_runner(|r| r.world_height()).unwrap_or(0.0)
}

/// Whether the frame loop is currently scheduled.
#[wasm_bindgen]
pub fn is_frame_loop_running() -> bool {
    FRAMES.with(|cell| cell.borrow().as_ref().map(FrameLoop::is_running).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_core::{MemoryStore, RecognitionId, UnsupportedRecognizer};

    fn install_runner() {
        let game = SpellRacer::new(
            GameConfig { seed: Some(5), ..GameConfig::default() },
            WordBank::standard(),
            Box::new(UnsupportedRecognizer),
            Box::new(MemoryStore::new()),
        );
        RUNNER.with(|cell| *cell.borrow_mut() = Some(GameRunner::new(game)));
    }

    fn pending_len() -> usize {
        PENDING.with(|q| q.borrow().len())
    }

    #[test]
    fn recognition_while_runner_busy_is_queued() {
        install_runner();
        let delivered = with_runner(|_| {
            deliver_recognition(RecognitionEvent::ended(RecognitionId(7)));
            pending_len()
        });
        assert_eq!(delivered, Some(1));

        // The next borrow drains the queue before running.
        assert_eq!(with_runner(|_| pending_len()), Some(0));
    }

    #[test]
    fn recognition_while_idle_is_applied_directly() {
        install_runner();
        deliver_recognition(RecognitionEvent::ended(RecognitionId(1)));
        assert_eq!(pending_len(), 0);
    }

    #[test]
    fn exports_before_init_return_empty_values() {
        assert_eq!(game_snapshot(), "");
        assert_eq!(game_take_toasts(), "[]");
        assert!(game_take_sounds().is_empty());
        assert_eq!(get_instance_count(), 0);
    }
}
