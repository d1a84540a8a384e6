//! # Clock Abstraction for Test Determinism
//!
//! Elapsed playback time is the entire detection signal in this project, so
//! code that measures it never calls `Instant::now()` directly. It samples a
//! `Clock` instead, which lets tests substitute a manually advanced clock and
//! produce exact elapsed durations.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Clock trait for time abstraction
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> Instant;
}

/// Real-time clock implementation
pub struct RealClock;

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock advanced explicitly by the caller
pub struct ManualClock {
    current_time: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current_time: Mutex::new(Instant::now()),
        }
    }

    pub fn new_with_start_time(start_time: Instant) -> Self {
        Self {
            current_time: Mutex::new(start_time),
        }
    }

    /// Advance the virtual clock by the specified duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock();
        *time += duration;
    }

    /// Set the virtual clock to a specific time
    pub fn set_time(&self, time: Instant) {
        let mut current = self.current_time.lock();
        *current = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current_time.lock()
    }
}

/// Thread-safe clock that can be shared across threads
pub type SharedClock = std::sync::Arc<dyn Clock + Send + Sync>;

/// Create a real-time clock
pub fn real_clock() -> SharedClock {
    std::sync::Arc::new(RealClock::new())
}

/// Create a manually advanced clock
pub fn manual_clock() -> SharedClock {
    std::sync::Arc::new(ManualClock::new())
}

/// Create a manually advanced clock with specific start time
pub fn manual_clock_with_start(start_time: Instant) -> SharedClock {
    std::sync::Arc::new(ManualClock::new_with_start_time(start_time))
}
