//! Fixed-capacity sample history with a running-average window.
//!
//! The store is plain data: it knows nothing about connections or locking.
//! [`crate::hub::MotionHub`] owns one behind its mutex and gates every call
//! on the connection state.

use crate::types::{RawSample, RawTriple, AXIS_COUNT};

/// History depth used by the motion hub
pub const HISTORY_LEN: usize = 64;

/// Capacity for the instant-only variant that keeps no history
pub const INSTANT_ONLY_LEN: usize = 1;

/// Circular history of raw samples plus accumulators since the last drain.
///
/// `N` must be a power of two.
#[derive(Clone, Debug)]
pub struct SampleStore<const N: usize> {
    history: [RawSample; N],
    cursor: usize,
    accel_sum: [i64; AXIS_COUNT],
    gyro_sum: [i64; AXIS_COUNT],
    count: u32,
}

impl<const N: usize> SampleStore<N> {
    const CAPACITY_CHECK: () = assert!(N.is_power_of_two(), "capacity must be a power of two");

    /// Create an empty store; the first append lands in slot 0
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;

        Self {
            history: [RawSample::default(); N],
            cursor: N - 1,
            accel_sum: [0; AXIS_COUNT],
            gyro_sum: [0; AXIS_COUNT],
            count: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Zero the averaging window. History is left alone.
    pub fn reset(&mut self) {
        self.accel_sum = [0; AXIS_COUNT];
        self.gyro_sum = [0; AXIS_COUNT];
        self.count = 0;
    }

    /// Drop history and the window and rewind the cursor. Empty slots read
    /// as zero readings stamped `timestamp` with sequence 0.
    pub fn clear(&mut self, timestamp: u32) {
        let empty = RawSample {
            timestamp,
            ..RawSample::default()
        };
        self.history = [empty; N];
        self.cursor = N - 1;
        self.reset();
    }

    /// Overwrite the oldest slot and fold the sample into the window.
    ///
    /// A window that already holds `u32::MAX` samples stops growing; history
    /// still advances.
    pub fn append(&mut self, sample: RawSample) {
        self.cursor = (self.cursor + 1) & (N - 1);
        self.history[self.cursor] = sample;

        if self.count == u32::MAX {
            return;
        }
        for axis in 0..AXIS_COUNT {
            self.accel_sum[axis] += i64::from(sample.accel[axis]);
            self.gyro_sum[axis] += i64::from(sample.gyro[axis]);
        }
        self.count += 1;
    }

    /// Sample `relative_index` steps behind the newest one.
    ///
    /// The index is taken modulo `N`: anything older than the history aliases
    /// back into it instead of failing.
    pub fn instant_read(&self, relative_index: u32) -> RawSample {
        let back = relative_index as usize & (N - 1);
        let slot = (self.cursor + N - back) & (N - 1);
        self.history[slot]
    }

    /// Samples folded into the window since the last reset
    pub fn running_count(&self) -> u32 {
        self.count
    }

    /// Truncating mean of the window, or `None` when the window is empty.
    /// Does not reset the window.
    pub fn running_mean(&self) -> Option<(RawTriple, RawTriple)> {
        if self.count == 0 {
            return None;
        }

        let count = i64::from(self.count);
        let mean = |sum: &[i64; AXIS_COUNT]| -> RawTriple {
            let mut out = [0i16; AXIS_COUNT];
            for (slot, total) in out.iter_mut().zip(sum.iter()) {
                *slot = (total / count).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16;
            }
            out
        };

        Some((mean(&self.accel_sum), mean(&self.gyro_sum)))
    }
}

impl<const N: usize> Default for SampleStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
