//! Clock Abstraction
//!
//! The publisher loop needs two notions of time: elapsed seconds since loop
//! start (drives the oscillators) and wall-clock epoch seconds (stamps the
//! sample). Both come through this trait so tests can pin them independently.

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Source of elapsed and wall-clock time
pub trait Clock: Send + Sync {
    /// Seconds since the clock was started
    fn elapsed_secs(&self) -> f64;

    /// Wall-clock seconds since the Unix epoch
    fn epoch_secs(&self) -> i64;

    /// Wall-clock milliseconds since the Unix epoch
    fn epoch_millis(&self) -> i64 {
        self.epoch_secs() * 1000
    }
}

/// Real clock: monotonic elapsed time anchored at construction
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn epoch_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-cranked clock for scenario tests
///
/// Cloning shares the underlying state, so a test can hold one handle and
/// advance time while the loop under test reads the other.
#[derive(Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

struct ManualState {
    elapsed: f64,
    epoch: i64,
}

impl ManualClock {
    pub fn new(epoch_secs: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                elapsed: 0.0,
                epoch: epoch_secs,
            })),
        }
    }

    /// Move both elapsed and wall-clock time forward
    pub fn advance(&self, secs: f64) {
        let mut state = self.inner.lock().unwrap();
        state.elapsed += secs;
        state.epoch += secs as i64;
    }

    /// Pin elapsed time without touching the epoch
    pub fn set_elapsed(&self, secs: f64) {
        self.inner.lock().unwrap().elapsed = secs;
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f64 {
        self.inner.lock().unwrap().elapsed
    }

    fn epoch_secs(&self) -> i64 {
        self.inner.lock().unwrap().epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_axes() {
        let clock = ManualClock::new(1_700_000_000);
        clock.advance(15.0);

        assert!((clock.elapsed_secs() - 15.0).abs() < f64::EPSILON);
        assert_eq!(clock.epoch_secs(), 1_700_000_015);
    }

    #[test]
    fn test_manual_clock_elapsed_pin_leaves_epoch() {
        let clock = ManualClock::new(100);
        clock.set_elapsed(45.0);

        assert_eq!(clock.epoch_secs(), 100);
        assert!((clock.elapsed_secs() - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_system_clock_elapsed_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.elapsed_secs();
        let second = clock.elapsed_secs();
        assert!(second >= first);
    }
}
