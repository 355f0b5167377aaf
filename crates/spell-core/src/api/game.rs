use crate::api::config::GameConfig;
use crate::api::outbox::{Notice, Outbox};
use crate::api::snapshot::HudSnapshot;
use crate::api::types::{GameEvent, GameState, SoundEvent};
use crate::core::rng::Rng;
use crate::core::storage::{HighScore, ScoreStore};
use crate::core::words::{WordBank, WordEntry};
use crate::input::controls::{Command, Controls, InputEvent};
use crate::speech::error::SpeechError;
use crate::speech::gate::{GateOutcome, SpeechGate};
use crate::speech::recognizer::{RecognitionEvent, SpeechRecognizer};
use crate::systems::play::{PlayField, TickOutcome};

const DEFAULT_SEED: u64 = 0x5EED_5BE1_1EA0;

/// The game session and its state machine.
///
/// ```text
/// Idle ──start──▶ Playing ──word collected──▶ Listening ──match──▶ Playing
///                    ▲                            │ mismatch, attempts left: stay
///                    └────────restart─── GameOver ◀┘ mismatch, attempts spent
/// ```
///
/// All mutation happens through `&mut self` on one thread: ticks, input and
/// recognition completions are each applied as a whole.
pub struct SpellRacer {
    config: GameConfig,
    bank: WordBank,
    rng: Rng,
    state: GameState,
    level: usize,
    word: WordEntry,
    field: PlayField,
    controls: Controls,
    score: u32,
    high_score: HighScore,
    gate: SpeechGate,
    sound_enabled: bool,
    outbox: Outbox,
}

impl SpellRacer {
    pub fn new(
        config: GameConfig,
        bank: WordBank,
        recognizer: Box<dyn SpeechRecognizer>,
        store: Box<dyn ScoreStore>,
    ) -> Self {
        let mut rng = Rng::new(config.seed.unwrap_or(DEFAULT_SEED));
        let word = bank.random_word(0, &mut rng).clone();
        let gate = SpeechGate::new(
            recognizer,
            config.language.clone(),
            config.grammar_hints,
            config.max_attempts,
        );
        let high_score = HighScore::load(config.storage_key.clone(), store);
        Self {
            field: PlayField::new(&config),
            config,
            bank,
            rng,
            state: GameState::Idle,
            level: 0,
            word,
            controls: Controls::new(),
            score: 0,
            high_score,
            gate,
            sound_enabled: true,
            outbox: Outbox::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.value()
    }

    pub fn word(&self) -> &WordEntry {
        &self.word
    }

    pub fn field(&self) -> &PlayField {
        &self.field
    }

    pub fn gate(&self) -> &SpeechGate {
        &self.gate
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn outbox(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    /// The frame loop should only be scheduled while this holds.
    pub fn wants_frames(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Apply one input event immediately.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), SpeechError> {
        match event {
            InputEvent::KeyDown { key } => {
                if self.state == GameState::Playing {
                    self.controls.press(key);
                }
            }
            InputEvent::KeyUp { key } => self.controls.release(key),
            InputEvent::PointerMove { y } => {
                if self.state == GameState::Playing {
                    self.controls.point_at(y);
                }
            }
            InputEvent::PointerEnd => self.controls.end_pointer(),
            InputEvent::Command(Command::Start) => self.start(),
            InputEvent::Command(Command::ToggleMic) => return self.toggle_mic(),
            InputEvent::Command(Command::ToggleSound) => self.toggle_sound(),
        }
        Ok(())
    }

    /// Start from `Idle` or restart from `GameOver`. Ignored mid-game.
    pub fn start(&mut self) {
        if !matches!(self.state, GameState::Idle | GameState::GameOver) {
            log::debug!("start ignored in {:?}", self.state);
            return;
        }
        self.gate.stop_listening();
        self.gate.reset_attempts();
        self.score = 0;
        self.level = 0;
        self.word = self.bank.random_word(0, &mut self.rng).clone();
        self.field.reset(&self.config);
        self.controls.clear();
        self.outbox.emit_event(GameEvent::score_changed(0, 0));
        self.set_state(GameState::Playing);
        log::info!("game started, first word {}", self.word.word);
    }

    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    /// Start or stop listening. Only meaningful in `Listening`.
    ///
    /// Unsupported recognition is reported to the caller and as a notice, and
    /// the state is left alone: the player stays in `Listening`.
    pub fn toggle_mic(&mut self) -> Result<(), SpeechError> {
        if self.state != GameState::Listening {
            return Ok(());
        }
        if !self.gate.is_supported() {
            self.outbox.notify(Notice::SpeechUnsupported);
            return Err(SpeechError::Unsupported);
        }
        if self.gate.is_listening() {
            self.gate.stop_listening();
            return Ok(());
        }
        match self.gate.start_listening(&self.word.word) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.outbox.notify(Notice::SpeechError { message: err.to_string() });
                Err(err)
            }
        }
    }

    /// Run up to `steps` ticks, stopping early once the state leaves `Playing`.
    pub fn advance(&mut self, steps: u32) {
        for _ in 0..steps {
            if self.tick().is_none() {
                break;
            }
        }
    }

    /// One game-loop tick. Returns `None` (and does nothing) unless `Playing`.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.state != GameState::Playing {
            return None;
        }
        let outcome = self.field.tick(&self.controls, &self.word, &self.config, &mut self.rng);

        if let Some(ch) = outcome.collected {
            self.award(self.config.letter_points);
            self.play(SoundEvent::COLLECT);
            self.outbox.emit_event(GameEvent::letter_collected(
                ch,
                self.field.collected().len(),
                self.word.len(),
            ));
        }

        if outcome.word_complete {
            self.gate.reset_attempts();
            self.set_state(GameState::Listening);
            self.outbox.notify(Notice::WordComplete {
                word: self.word.word.clone(),
                attempts_left: self.gate.attempts_left(),
            });
            log::info!("word {} collected, listening", self.word.word);
        }

        Some(outcome)
    }

    /// Apply a completion from the speech recognizer.
    pub fn on_recognition(&mut self, event: RecognitionEvent) {
        let Some(outcome) = self.gate.accept(event) else {
            return;
        };
        if self.state != GameState::Listening {
            log::debug!("recognition outcome ignored in {:?}", self.state);
            return;
        }
        match outcome {
            GateOutcome::Heard(transcript) => self.evaluate(transcript),
            GateOutcome::Failed(err) => {
                self.outbox.notify(Notice::SpeechError { message: err.to_string() });
            }
            GateOutcome::Ended => {}
        }
    }

    fn evaluate(&mut self, transcript: String) {
        if transcript == self.word.word {
            self.word_spoken();
        } else if self.gate.attempts() >= self.gate.max_attempts() {
            self.game_over();
        } else {
            self.outbox.notify(Notice::TryAgain {
                heard: transcript,
                expected: self.word.word.clone(),
                attempts_left: self.gate.attempts_left(),
            });
        }
    }

    fn word_spoken(&mut self) {
        self.play(SoundEvent::SUCCESS);
        self.outbox.notify(Notice::Correct { word: self.word.word.clone() });
        self.award(self.config.word_points);

        self.level = (self.level + 1).min(self.bank.max_level());
        self.word = self.bank.random_word(self.level, &mut self.rng).clone();
        self.field.clear_word();
        self.gate.reset_attempts();
        self.set_state(GameState::Playing);
        log::info!("advanced to level {}, next word {}", self.level, self.word.word);
    }

    fn game_over(&mut self) {
        self.play(SoundEvent::GAME_OVER);
        self.gate.stop_listening();
        self.set_state(GameState::GameOver);
        let new_high_score = self.high_score.record(self.score);
        if new_high_score {
            log::info!("new high score {}", self.score);
        }
        self.outbox.notify(Notice::GameOver {
            word: self.word.word.clone(),
            score: self.score,
            new_high_score,
        });
        log::info!("game over on {} with score {}", self.word.word, self.score);
    }

    fn award(&mut self, points: u32) {
        self.score += points;
        self.outbox.emit_event(GameEvent::score_changed(self.score, points));
    }

    fn play(&mut self, sound: SoundEvent) {
        if self.sound_enabled {
            self.outbox.emit_sound(sound);
        }
    }

    fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.outbox.emit_event(GameEvent::state_changed(to, from));
    }

    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            state: self.state,
            level: self.level + 1,
            score: self.score,
            high_score: self.high_score.value(),
            word: self.word.word.clone(),
            hint: self.word.hint.clone(),
            collected: self.field.collected().len(),
            collected_mask: HudSnapshot::letter_mask(self.word.len(), self.field.collected().len()),
            attempts_left: self.gate.attempts_left(),
            listening: self.gate.is_listening(),
            transcript: self.gate.transcript().map(str::to_string),
            error: self.gate.error().map(|e| e.to_string()),
            speech_supported: self.gate.is_supported(),
            sound_enabled: self.sound_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::core::words::WordEntry;
    use crate::input::controls::Key;
    use crate::speech::recognizer::testing::FakeRecognizer;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl ScoreStore for SharedStore {
        fn get(&self, key: &str) -> Option<u32> {
            self.0.borrow().get(key)
        }
        fn set(&mut self, key: &str, value: u32) {
            self.0.borrow_mut().set(key, value);
        }
    }

    /// Level 0 is always CAT, level 1 always DOG.
    fn cat_bank() -> WordBank {
        WordBank::from_levels(vec![
            vec![WordEntry::new("CAT", "A furry pet")],
            vec![WordEntry::new("DOG", "Man's best friend")],
        ])
        .unwrap()
    }

    fn game_with(rec: &FakeRecognizer, store: SharedStore) -> SpellRacer {
        let config = GameConfig { seed: Some(11), ..GameConfig::default() };
        SpellRacer::new(config, cat_bank(), Box::new(rec.clone()), Box::new(store))
    }

    fn game(rec: &FakeRecognizer) -> SpellRacer {
        game_with(rec, SharedStore::default())
    }

    /// Steer onto letters until the word is collected.
    fn collect_word(g: &mut SpellRacer) {
        for _ in 0..10_000 {
            if g.state() != GameState::Playing {
                return;
            }
            if let Some(y) = g.field().letter().map(|l| l.y) {
                g.handle(InputEvent::PointerMove { y }).unwrap();
            }
            g.tick();
        }
        panic!("word was not collected");
    }

    /// Start a recognition and deliver `raw` as its result.
    fn speak(g: &mut SpellRacer, rec: &FakeRecognizer, raw: &str) {
        g.toggle_mic().unwrap();
        g.on_recognition(RecognitionEvent::transcript(rec.last_id(), raw));
    }

    #[test]
    fn starts_idle_and_does_not_tick() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        assert_eq!(g.state(), GameState::Idle);
        assert!(!g.wants_frames());
        assert!(g.tick().is_none());
    }

    #[test]
    fn scenario_collect_and_speak_cat() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        assert!(g.wants_frames());
        collect_word(&mut g);
        assert_eq!(g.state(), GameState::Listening);
        assert_eq!(g.field().collected(), "CAT");
        assert_eq!(g.score(), 30);
        assert!(!g.wants_frames());

        speak(&mut g, &rec, "Cat.");
        assert_eq!(g.state(), GameState::Playing);
        assert_eq!(g.level(), 1);
        assert_eq!(g.score(), 80);
        assert_eq!(g.word().word, "DOG");
        assert!(g.field().collected().is_empty());
        assert!(g.field().letter().is_none());
        assert_eq!(g.gate().attempts(), 0);
    }

    #[test]
    fn scenario_three_wrong_answers_end_the_game() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        g.outbox().clear();

        speak(&mut g, &rec, "dog");
        assert_eq!(g.state(), GameState::Listening);
        speak(&mut g, &rec, "dog");
        assert_eq!(g.state(), GameState::Listening);
        speak(&mut g, &rec, "dog");
        assert_eq!(g.state(), GameState::GameOver);
        assert_eq!(g.word().word, "CAT");

        let notices = g.outbox().take_notices();
        assert!(matches!(
            notices.last(),
            Some(Notice::GameOver { word, .. }) if word == "CAT"
        ));
        let retries = notices.iter().filter(|n| matches!(n, Notice::TryAgain { .. })).count();
        assert_eq!(retries, 2);
    }

    #[test]
    fn scenario_permission_denied_keeps_listening() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        g.toggle_mic().unwrap();
        assert!(g.gate().is_listening());
        let err = SpeechError::from_code("not-allowed").unwrap();
        g.on_recognition(RecognitionEvent::failed(rec.last_id(), err));
        assert!(!g.gate().is_listening());
        assert_eq!(g.state(), GameState::Listening);
        let snap = g.snapshot();
        assert_eq!(snap.error.as_deref(), Some("Microphone access was denied by the user."));
        assert_eq!(snap.attempts_left, 3);
    }

    #[test]
    fn unsupported_speech_is_surfaced_without_state_change() {
        let rec = FakeRecognizer::unsupported();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        g.outbox().clear();
        assert_eq!(g.toggle_mic(), Err(SpeechError::Unsupported));
        assert_eq!(g.state(), GameState::Listening);
        assert_eq!(g.outbox().take_notices(), vec![Notice::SpeechUnsupported]);
    }

    #[test]
    fn mic_toggle_stops_active_recognition() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        g.toggle_mic().unwrap();
        let id = rec.last_id();
        g.toggle_mic().unwrap();
        assert!(!g.gate().is_listening());
        assert_eq!(rec.log.borrow().stops, vec![id]);
        // Stopped operation's late result is dropped.
        g.on_recognition(RecognitionEvent::transcript(id, "cat"));
        assert_eq!(g.state(), GameState::Listening);
    }

    #[test]
    fn mic_is_ignored_outside_listening() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        assert_eq!(g.toggle_mic(), Ok(()));
        assert_eq!(rec.start_count(), 0);
    }

    #[test]
    fn game_over_records_high_score_once() {
        let rec = FakeRecognizer::new();
        let store = SharedStore::default();
        let mut g = game_with(&rec, store.clone());
        g.start();
        collect_word(&mut g);
        for _ in 0..3 {
            speak(&mut g, &rec, "bat");
        }
        assert_eq!(g.state(), GameState::GameOver);
        assert_eq!(g.high_score(), 30);
        assert_eq!(store.0.borrow().get("spellRacerHighScore"), Some(30));
        assert_eq!(store.0.borrow().writes(), 1);
    }

    #[test]
    fn lower_score_keeps_stored_high_score() {
        let rec = FakeRecognizer::new();
        let store = SharedStore(Rc::new(RefCell::new(MemoryStore::with_value("spellRacerHighScore", 500))));
        let mut g = game_with(&rec, store.clone());
        assert_eq!(g.high_score(), 500);
        g.start();
        collect_word(&mut g);
        for _ in 0..3 {
            speak(&mut g, &rec, "bat");
        }
        assert_eq!(g.high_score(), 500);
        assert_eq!(store.0.borrow().writes(), 0);
    }

    #[test]
    fn restart_resets_session() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        for _ in 0..3 {
            speak(&mut g, &rec, "bat");
        }
        g.handle(InputEvent::Command(Command::Start)).unwrap();
        assert_eq!(g.state(), GameState::Playing);
        assert_eq!(g.score(), 0);
        assert_eq!(g.level(), 0);
        assert_eq!(g.gate().attempts(), 0);
        assert!(g.field().collected().is_empty());
        assert_eq!(g.field().player.y, 100.0);
    }

    #[test]
    fn start_is_ignored_while_playing() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        g.tick();
        let letter = g.field().letter().copied();
        g.start();
        assert_eq!(g.field().letter().copied(), letter);
    }

    #[test]
    fn level_is_capped_at_last_table_entry() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        for expected_level in [1, 1, 1] {
            collect_word(&mut g);
            let word = g.word().word.clone();
            speak(&mut g, &rec, &word.to_lowercase());
            assert_eq!(g.level(), expected_level);
        }
    }

    #[test]
    fn movement_input_ignored_outside_playing() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.handle(InputEvent::KeyDown { key: Key::Up }).unwrap();
        g.handle(InputEvent::PointerMove { y: 12.0 }).unwrap();
        g.start();
        g.tick();
        assert_eq!(g.field().player.y, 100.0);
    }

    #[test]
    fn sounds_follow_the_sound_toggle() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        assert_eq!(g.outbox().take_sounds(), vec![SoundEvent::COLLECT; 3]);

        g.handle(InputEvent::Command(Command::ToggleSound)).unwrap();
        assert!(!g.sound_enabled());
        speak(&mut g, &rec, "cat");
        assert!(g.outbox().take_sounds().is_empty());
    }

    #[test]
    fn state_change_events_are_emitted() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        let events = g.outbox().take_events();
        assert!(events.contains(&GameEvent::state_changed(GameState::Playing, GameState::Idle)));
    }

    #[test]
    fn snapshot_mask_marks_collected_prefix() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        assert_eq!(g.snapshot().collected_mask, vec![false; 3]);
        for _ in 0..10_000 {
            if g.field().collected().len() == 1 {
                break;
            }
            if let Some(y) = g.field().letter().map(|l| l.y) {
                g.handle(InputEvent::PointerMove { y }).unwrap();
            }
            g.tick();
        }
        let snap = g.snapshot();
        assert_eq!(snap.collected_mask, vec![true, false, false]);
        assert!(snap.to_json().contains("\"collectedMask\":[true,false,false]"));
    }

    #[test]
    fn snapshot_reflects_progress() {
        let rec = FakeRecognizer::new();
        let mut g = game(&rec);
        g.start();
        collect_word(&mut g);
        let snap = g.snapshot();
        assert_eq!(snap.state, GameState::Listening);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.word, "CAT");
        assert_eq!(snap.hint, "A furry pet");
        assert_eq!(snap.collected, 3);
        assert_eq!(snap.collected_mask, vec![true; 3]);
        assert_eq!(snap.attempts_left, 3);
        assert!(snap.speech_supported);
        assert!(snap.to_json().contains("\"state\":\"listening\""));
    }

    #[derive(Debug, Clone)]
    enum Reply {
        Wrong,
        Fail,
        Silence,
    }

    fn reply() -> impl Strategy<Value = Reply> {
        prop_oneof![Just(Reply::Wrong), Just(Reply::Fail), Just(Reply::Silence)]
    }

    proptest! {
        #[test]
        fn game_over_exactly_on_third_mismatch(replies in prop::collection::vec(reply(), 1..20)) {
            let rec = FakeRecognizer::new();
            let mut g = game(&rec);
            g.start();
            collect_word(&mut g);
            let mut mismatches = 0;
            for r in replies {
                if g.state() == GameState::GameOver {
                    break;
                }
                g.toggle_mic().unwrap();
                let id = rec.last_id();
                match r {
                    Reply::Wrong => {
                        g.on_recognition(RecognitionEvent::transcript(id, "nope"));
                        mismatches += 1;
                    }
                    Reply::Fail => g.on_recognition(RecognitionEvent::failed(id, SpeechError::NoSpeechDetected)),
                    Reply::Silence => g.on_recognition(RecognitionEvent::ended(id)),
                }
                prop_assert!(g.gate().attempts() <= 3);
                prop_assert_eq!(g.state() == GameState::GameOver, mismatches == 3);
            }
        }

        #[test]
        fn high_score_is_max_of_before_and_final(before in 0u32..200, words_right in 0usize..3) {
            let rec = FakeRecognizer::new();
            let store = SharedStore(Rc::new(RefCell::new(
                MemoryStore::with_value("spellRacerHighScore", before),
            )));
            let mut g = game_with(&rec, store);
            g.start();
            for _ in 0..words_right {
                collect_word(&mut g);
                let word = g.word().word.clone();
                speak(&mut g, &rec, &word);
            }
            collect_word(&mut g);
            for _ in 0..3 {
                speak(&mut g, &rec, "zzz");
            }
            let final_score = g.score();
            prop_assert_eq!(g.state(), GameState::GameOver);
            prop_assert_eq!(g.high_score(), before.max(final_score));
        }
    }
}
