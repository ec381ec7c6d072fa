/// Monotonic simulation clock.
///
/// Every timestamp in the simulation (effect expiries, director schedule,
/// typewriter pacing) is derived from the tick counter, never from wall time,
/// so a run is fully reproducible from its seed and input sequence.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    tick_rate: u32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl SimClock {
    /// Create a clock at tick 0 running at `tick_rate` ticks per second.
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick: 0,
            tick_rate: tick_rate.max(1),
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Ticks per second.
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Milliseconds elapsed since tick 0.
    pub fn now_ms(&self) -> u64 {
        self.tick * 1000 / u64::from(self.tick_rate)
    }

    /// Number of whole ticks covering `ms` milliseconds, rounded up.
    pub fn ms_to_ticks(&self, ms: u64) -> u64 {
        (ms * u64::from(self.tick_rate)).div_ceil(1000)
    }
}
