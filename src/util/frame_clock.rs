use web_time::{Duration, Instant};

/// Wall-clock frame delta source, with a smoothed FPS readout.
pub struct FrameClock {
    /// Previous tick, `None` before the first frame.
    last_tick: Option<Instant>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Clock that has not ticked yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_tick: None,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Milliseconds since the previous tick. The first tick returns 0.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last_tick
            .replace(now)
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));

        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + (1.0 / frame_time) * self.smoothing;
        }
        frame_time * 1000.0
    }

    /// The current FPS (smoothed).
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
    }

    #[test]
    fn delta_is_reported_in_milliseconds() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        let _ = clock.tick_at(start);
        let delta = clock.tick_at(start + Duration::from_millis(16));
        assert!((delta - 16.0).abs() < 0.01);
    }

    #[test]
    fn fps_moves_toward_the_frame_rate() {
        let mut clock = FrameClock::new();
        let mut now = Instant::now();
        let _ = clock.tick_at(now);
        for _ in 0..200 {
            now += Duration::from_millis(10);
            let _ = clock.tick_at(now);
        }
        assert!((clock.fps() - 100.0).abs() < 1.0);
    }
}
