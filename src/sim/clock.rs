//! Frame clocks

use std::time::Instant;

/// Source of elapsed seconds between frames
pub trait FrameClock {
    /// Seconds since the previous call (0 on the first call)
    fn delta(&mut self) -> f32;
}

/// Wall-clock time from a monotonic source
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Option<Instant>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameClock for SystemClock {
    fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }
}

/// Constant step, for replays and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub dt: f32,
}

impl FixedClock {
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }
}

impl FrameClock for FixedClock {
    fn delta(&mut self) -> f32 {
        self.dt
    }
}
