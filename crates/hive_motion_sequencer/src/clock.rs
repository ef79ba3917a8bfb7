// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tick sources.

use std::time::Instant;

/// Source of the `now` snapshot handed to each tick, in seconds
pub trait Clock {
    /// Current time
    fn now(&self) -> f32;
}

/// Clock advanced by hand, for tests and simulated playback
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f32,
}

impl ManualClock {
    /// Create a clock at `now`
    pub fn new(now: f32) -> Self {
        Self { now }
    }

    /// Move forward by `delta` seconds and return the new time
    pub fn advance(&mut self, delta: f32) -> f32 {
        self.now += delta.max(0.0);
        self.now
    }

    /// Jump to an absolute time (never backwards)
    pub fn set(&mut self, now: f32) {
        self.now = self.now.max(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.now
    }
}

/// Monotonic wall clock measured from its creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start measuring from now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_never_goes_back() {
        let mut clock = ManualClock::new(1.0);
        assert_eq!(clock.advance(0.5), 1.5);
        assert_eq!(clock.advance(-3.0), 1.5);
        clock.set(0.2);
        assert_eq!(clock.now(), 1.5);
        clock.set(4.0);
        assert_eq!(clock.now(), 4.0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
