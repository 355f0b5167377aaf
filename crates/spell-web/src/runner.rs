use spell_core::{
    build_render_buffer, FrameClock, InputEvent, Notice, RecognitionEvent, RenderBuffer,
    SpeechError, SpellRacer, Toast,
};

/// Drives a [`SpellRacer`] from browser callbacks.
///
/// wasm-bindgen cannot export this struct's borrowing API directly, so the
/// crate keeps one instance in a `thread_local!` and exposes free functions.
pub struct GameRunner {
    game: SpellRacer,
    clock: FrameClock,
    render_buffer: RenderBuffer,
}

impl GameRunner {
    pub fn new(game: SpellRacer) -> Self {
        let clock = FrameClock::new(game.config().fixed_dt);
        let mut runner = Self {
            game,
            clock,
            render_buffer: RenderBuffer::new(),
        };
        runner.rebuild_render_buffer();
        runner
    }

    pub fn game(&self) -> &SpellRacer {
        &self.game
    }

    /// Apply an input event right away, outside the frame loop.
    pub fn dispatch(&mut self, event: InputEvent) -> Result<(), SpeechError> {
        let result = self.game.handle(event);
        self.rebuild_render_buffer();
        result
    }

    /// Apply a recognizer completion as one atomic step.
    pub fn on_recognition(&mut self, event: RecognitionEvent) {
        self.game.on_recognition(event);
        self.rebuild_render_buffer();
    }

    /// Run one display frame. Returns whether another frame should be requested.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let steps = self.clock.frame(now_ms);
        self.game.advance(steps);
        self.rebuild_render_buffer();

        let keep_running = self.game.wants_frames();
        if !keep_running {
            // Next start begins from a fresh timestamp.
            self.clock.resume();
        }
        keep_running
    }

    pub fn wants_frames(&self) -> bool {
        self.game.wants_frames()
    }

    fn rebuild_render_buffer(&mut self) {
        build_render_buffer(self.game.field(), self.game.config(), &mut self.render_buffer);
    }

    // ---- Accessors read by the presentation layer ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn world_width(&self) -> f32 {
        self.game.config().world_width
    }

    pub fn world_height(&self) -> f32 {
        self.game.config().world_height
    }

    pub fn snapshot_json(&self) -> String {
        self.game.snapshot().to_json()
    }

    /// Sound ids emitted since the last call.
    pub fn take_sounds(&mut self) -> Vec<u32> {
        self.game.outbox().take_sounds().iter().map(|s| s.0).collect()
    }

    /// Game events emitted since the last call, flattened to `kind, a, b, c` quads.
    pub fn take_events(&mut self) -> Vec<f32> {
        self.game
            .outbox()
            .take_events()
            .iter()
            .flat_map(|e| [e.kind, e.a, e.b, e.c])
            .collect()
    }

    /// Pending toasts as a JSON array.
    pub fn take_toasts_json(&mut self) -> String {
        let toasts: Vec<Toast> = self.game.outbox().take_notices().iter().map(Notice::to_toast).collect();
        serde_json::to_string(&toasts).unwrap_or_else(|_| "[]".to_string())
    }
}
