use std::time::Duration;

/// Accumulates elapsed time and reports when a gravity step is due.
#[derive(Clone, Copy, Debug)]
pub struct GravityTimer {
    interval: Duration,
    since_last: Duration,
}

impl GravityTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            since_last: Duration::ZERO,
        }
    }

    /// Adds `elapsed` and returns `true` at most once per call when the
    /// interval has been reached; the accumulator restarts from zero.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.since_last = self.since_last.saturating_add(elapsed);
        if self.since_last >= self.interval {
            self.since_last = Duration::ZERO;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.since_last = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_interval_is_reached() {
        let mut timer = GravityTimer::new(Duration::from_millis(500));
        assert!(!timer.advance(Duration::from_millis(200)));
        assert!(!timer.advance(Duration::from_millis(299)));
        assert!(timer.advance(Duration::from_millis(1)));
        assert!(!timer.advance(Duration::from_millis(1)));
    }

    #[test]
    fn long_gap_fires_a_single_step() {
        let mut timer = GravityTimer::new(Duration::from_millis(500));
        assert!(timer.advance(Duration::from_secs(3)));
        assert!(!timer.advance(Duration::ZERO));
    }

    #[test]
    fn crossing_a_second_boundary_is_not_special() {
        // Sampling only the millisecond field would see 900 -> 100 here.
        let mut timer = GravityTimer::new(Duration::from_millis(500));
        assert!(!timer.advance(Duration::from_millis(400)));
        assert!(timer.advance(Duration::from_millis(200)));
    }
}
