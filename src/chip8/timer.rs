use std::time::{Duration, Instant};

/// One 60Hz tick.
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// The delay and sound timers.
///
/// They count down at 60Hz of wall-clock time, independent of how often
/// instructions run. Each call to `update` decrements at most once, no matter
/// how long it has been since the last tick.
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
    last_tick: Instant,
}

impl Timers {
    pub fn new(now: Instant) -> Self {
        Self {
            delay: 0,
            sound: 0,
            last_tick: now,
        }
    }

    /// Account for the time elapsed up to `now`. Returns true if a tick
    /// happened.
    pub fn update(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_tick) < TICK {
            return false;
        }
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        self.last_tick = now;
        true
    }

    /// Forget any time elapsed so far, e.g. after the machine was suspended.
    pub fn resync(&mut self, now: Instant) {
        self.last_tick = now;
    }

    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
