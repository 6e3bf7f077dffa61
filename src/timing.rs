//! Time source for every wait in the run
//!
//! The cycle loop, the macro player and the cooldowns all suspend through a
//! [`Clock`] so that the whole state machine can be driven by simulated time.

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source with blocking sleep
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`thread::sleep`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() >= before + Duration::from_millis(2));
    }
}
