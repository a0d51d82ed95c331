//! Time utilities for game simulation

use std::time::Instant;

/// Default tick rate
pub const SIMULATION_TPS: u32 = 60; // 60 ticks per second

/// Highest rate the millisecond frame clock can express
pub const MAX_SIMULATION_TPS: u32 = 1_000;

/// Milliseconds covered by one tick at the given rate, never zero
pub fn tick_millis(tps: u32) -> u64 {
    (1_000 / u64::from(tps.max(1))).max(1)
}

/// Monotonic millisecond clock for weapon timing.
///
/// Fire gating compares timestamps taken from the same `Timer`, so wall-clock
/// jumps never unlock a weapon early.
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_millis_never_divides_by_zero() {
        assert_eq!(tick_millis(60), 16);
        assert_eq!(tick_millis(0), 1_000);
        assert_eq!(tick_millis(MAX_SIMULATION_TPS), 1);
        assert_eq!(tick_millis(2_000), 1);
        assert_eq!(tick_millis(u32::MAX), 1);
    }

    #[test]
    fn timer_is_monotonic() {
        let timer = Timer::new();
        let a = timer.elapsed_ms();
        let b = timer.elapsed_ms();
        assert!(b >= a);
    }
}
