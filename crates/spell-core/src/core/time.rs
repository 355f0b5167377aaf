/// Maximum fixed steps run for a single display frame.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed timestep accumulator.
/// Turns variable display-frame durations into a whole number of game ticks,
/// so letter and player speeds (expressed per tick) hold at any refresh rate.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self { dt, accumulator: 0.0 }
    }

    /// Add frame time to the accumulator. Returns the number of ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent spiral of death after a long stall
        self.accumulator = self.accumulator.min(self.dt * MAX_STEPS_PER_FRAME as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Drop any partial tick carried over from earlier frames.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Converts display-callback timestamps (milliseconds) into tick counts.
///
/// The first frame after `resume` only records its timestamp, so time spent
/// suspended (listening, game over) never turns into catch-up ticks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    timestep: FixedTimestep,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(dt: f32) -> Self {
        Self { timestep: FixedTimestep::new(dt), last_ms: None }
    }

    /// Feed the timestamp of a display frame. Returns ticks to run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let steps = match self.last_ms {
            Some(last) => self.timestep.accumulate(((now_ms - last) / 1000.0) as f32),
            None => 0,
        };
        self.last_ms = Some(now_ms);
        steps
    }

    /// Forget the previous timestamp. Call when the loop is (re)started.
    pub fn resume(&mut self) {
        self.last_ms = None;
        self.timestep.reset();
    }

    pub fn is_running(&self) -> bool {
        self.last_ms.is_some()
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }
}
