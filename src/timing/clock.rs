//! Millisecond time sources.

use parking_lot::Mutex;

/// Source of fractional-millisecond timestamps.
///
/// Only differences between two readings are ever used, so wall-clock
/// time is acceptable.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1000.0
    }
}

/// Hand-driven clock for deterministic timing.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Mutex::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        *self.now.lock() = ms;
    }

    pub fn advance(&self, ms: f64) {
        *self.now.lock() += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now_ms() > a);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(10.0);
        clock.advance(2.5);
        assert_eq!(clock.now_ms(), 12.5);
        clock.set(1.0);
        assert_eq!(clock.now_ms(), 1.0);
    }
}
