/// Fixed timestep accumulator.
/// Ensures simulation runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Upper bound on steps per frame.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !(frame_dt > 0.0) {
            return 0;
        }
        self.accumulator += frame_dt;
        // Cap to prevent a spiral of death after a long stall
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        // Tolerate rounding so an exact multiple of dt is not a step short
        let steps = ((self.accumulator / self.dt + 1e-4) as u32).min(self.max_steps);
        self.accumulator = (self.accumulator - steps as f32 * self.dt).max(0.0);
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Repeating interval gate: `tick` reports how many periods elapsed.
/// Used for heal cadence, burn ticks and other "every N seconds" effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    period: f32,
    elapsed: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self { period, elapsed: 0.0 }
    }

    /// Advance and return the number of whole periods completed.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if self.period <= 0.0 {
            return 0;
        }
        self.elapsed += dt;
        let fired = (self.elapsed / self.period) as u32;
        self.elapsed -= fired as f32 * self.period;
        fired
    }

    /// Change the period, keeping progress into the current one.
    pub fn set_period(&mut self, period: f32) {
        self.period = period;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
