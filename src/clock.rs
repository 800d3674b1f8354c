use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Source of the device clock stamped onto every ingested sample.
///
/// Only the low 32 bits of a microsecond counter are kept, so readings wrap
/// roughly every 71 minutes.
pub trait DeviceClock: Send + Sync {
    fn now(&self) -> u32;
}

/// Microseconds since the clock was created
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceClock for SystemClock {
    fn now(&self) -> u32 {
        // Truncation is the wrap
        self.epoch.elapsed().as_micros() as u32
    }
}

/// Externally driven clock for tests and simulated transports
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU32,
}

impl ManualClock {
    pub fn new(start: u32) -> Self {
        Self {
            micros: AtomicU32::new(start),
        }
    }

    pub fn set(&self, micros: u32) {
        self.micros.store(micros, Ordering::Relaxed);
    }

    /// Advance with wraparound
    pub fn advance(&self, micros: u32) {
        self.micros.fetch_add(micros, Ordering::Relaxed);
    }
}

impl DeviceClock for ManualClock {
    fn now(&self) -> u32 {
        self.micros.load(Ordering::Relaxed)
    }
}
