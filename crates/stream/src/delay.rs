//! Jittered exponential back-off used to pace empty polling rounds.

use std::time::Duration;

/// Default ceiling on the back-off base.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(16);

/// Exponential back-off generator with jitter and reset.
///
/// The base starts at one second and doubles on every
/// [`next`](AdaptiveDelay::next) call,
/// capped at the configured ceiling. Jitter is drawn uniformly from
/// ±1/32 of the base — enough to spread polling across consumers of
/// the same feed without distorting the schedule.
#[derive(Debug, Clone)]
pub struct AdaptiveDelay {
    /// Current base value in seconds. Invariant: `1.0 <= base <= max`.
    base: f64,
    max: f64,
}

impl AdaptiveDelay {
    pub fn new(max: Duration) -> Self {
        Self {
            base: 1.0,
            max: max.as_secs_f64(),
        }
    }

    /// The pacing value for this round; doubles the base for the next
    /// call, capped at the ceiling.
    pub fn next(&mut self) -> Duration {
        let max_jitter = self.base / 16.0;
        let value = self.base + fastrand::f64() * max_jitter - max_jitter / 2.0;
        self.base = (self.base * 2.0).min(self.max);
        Duration::from_secs_f64(value.max(0.0))
    }

    /// Drop back to the initial one-second base.
    pub fn reset(&mut self) {
        self.base = 1.0;
    }
}

impl Default for AdaptiveDelay {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Jitter keeps each value within ±1/32 of the base.
    fn assert_near(value: Duration, base: f64) {
        let secs = value.as_secs_f64();
        assert!(secs >= base - base / 32.0, "{secs} too low for base {base}");
        assert!(secs <= base + base / 32.0, "{secs} too high for base {base}");
    }

    #[test]
    fn doubles_up_to_the_ceiling() {
        let mut delay = AdaptiveDelay::new(Duration::from_secs(16));
        assert_near(delay.next(), 1.0);
        assert_near(delay.next(), 2.0);
        assert_near(delay.next(), 4.0);
        assert_near(delay.next(), 8.0);
        assert_near(delay.next(), 16.0);
        // Pinned at the ceiling from here on.
        assert_near(delay.next(), 16.0);
        assert_near(delay.next(), 16.0);
    }

    #[test]
    fn reset_restores_the_initial_base() {
        let mut delay = AdaptiveDelay::new(Duration::from_secs(16));
        for _ in 0..5 {
            delay.next();
        }
        delay.reset();
        assert_near(delay.next(), 1.0);
    }

    #[test]
    fn ceiling_at_the_base_pins_immediately() {
        // The first value is the one-second base; everything after
        // sits at the ceiling.
        let mut delay = AdaptiveDelay::new(Duration::from_secs(1));
        assert_near(delay.next(), 1.0);
        assert_near(delay.next(), 1.0);
    }
}
