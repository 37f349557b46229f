//! Wall-clock frame timing.

use std::time::{Duration, Instant};

/// Timing snapshot for one frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Seconds since the clock was created.
    pub elapsed: f64,
    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Produces per-frame delta and elapsed time.
///
/// Delta time is the raw wall-clock difference between ticks; nothing is
/// clamped, so movement stays proportional to real time even after a stall.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    /// A clock starting now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// A clock whose elapsed time is measured from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frame_index: 0,
        }
    }

    /// Seconds since the clock was created, without advancing it.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Advances the clock to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`. Instants earlier than the previous tick
    /// yield `dt == 0`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last);
        self.last = now.max(self.last);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self
                .last
                .saturating_duration_since(self.start)
                .as_secs_f64(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    /// Number of ticks so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Duration of the most recent tick relative to clock start.
    pub fn since_start(&self) -> Duration {
        self.last.saturating_duration_since(self.start)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_delta_and_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let first = clock.tick_at(start + Duration::from_millis(16));
        assert!((first.dt - 0.016).abs() < 1e-6);
        assert_eq!(first.frame_index, 0);

        let second = clock.tick_at(start + Duration::from_millis(50));
        assert!((second.dt - 0.034).abs() < 1e-6);
        assert!((second.elapsed - 0.050).abs() < 1e-9);
        assert_eq!(second.frame_index, 1);
        assert_eq!(clock.since_start(), Duration::from_millis(50));
    }

    #[test]
    fn going_backwards_gives_zero_dt() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(100));

        let back = clock.tick_at(start + Duration::from_millis(40));
        assert_eq!(back.dt, 0.0);
        assert!((back.elapsed - 0.100).abs() < 1e-9);
    }
}
