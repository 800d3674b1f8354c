//! Consumer-side reads.
//!
//! Two modes: the averaged read drains the running window (falling back to
//! the newest sample when the window is empty), the indexed read walks back
//! through history without touching the window. Both are non-blocking
//! apart from the hub lock and fail with `NotConnected` while no controller
//! is paired.
//!
//! Reads that feed consumer-relative counters return the sampling origin
//! taken under the same lock, so a reconnect can never pair new samples
//! with an old origin.

use crate::error::MotionResult;
use crate::hub::MotionHub;
use crate::types::{RawSample, RawTriple, SampleHistory, SampleOrigin, SampledReading};

impl<const N: usize> MotionHub<N> {
    /// Start a fresh averaging window. History is untouched.
    pub fn reset_sampling(&self) -> MotionResult<()> {
        self.with_connected(|state| state.store.reset())
    }

    /// Start a fresh averaging window and anchor the sampling origin at the
    /// newest stored sample, in one critical section. The instant fallback
    /// right after this reads as (0, 0).
    pub fn restart_window(&self) -> MotionResult<SampleOrigin> {
        self.with_connected(|state| {
            state.store.reset();
            let newest = state.store.instant_read(0);
            state.origin = SampleOrigin::new(newest.timestamp, newest.sequence);
            state.origin
        })
    }

    /// Current sampling origin. Available while disconnected.
    pub fn origin(&self) -> MotionResult<SampleOrigin> {
        Ok(self.lock()?.origin)
    }

    /// Mean accel/gyro since the last averaged read, or the newest sample
    /// if nothing arrived in between
    pub fn sampled_accel_gyro(&self) -> MotionResult<(RawTriple, RawTriple)> {
        self.sampled_reading().map(|reading| (reading.accel, reading.gyro))
    }

    /// Averaged read plus the counters of the newest sample, under one lock
    pub fn sampled_reading(&self) -> MotionResult<SampledReading> {
        self.with_connected(|state| {
            let newest = state.store.instant_read(0);
            let averaged = state.store.running_count();

            let (accel, gyro) = match state.store.running_mean() {
                Some(mean) => {
                    state.store.reset();
                    mean
                }
                None => (newest.accel, newest.gyro),
            };

            SampledReading {
                accel,
                gyro,
                timestamp: newest.timestamp,
                sequence: newest.sequence,
                averaged,
                origin: state.origin,
            }
        })
    }

    /// Sample `relative_index` steps behind the newest. Indices wrap modulo
    /// the history capacity.
    pub fn instant_sample(&self, relative_index: u32) -> MotionResult<RawSample> {
        self.with_connected(|state| state.store.instant_read(relative_index))
    }

    /// The last `count` samples, oldest first, read under one lock.
    /// `count` is capped at the history capacity.
    pub fn recent_samples(&self, count: usize) -> MotionResult<Vec<RawSample>> {
        self.recent_history(count).map(|history| history.samples)
    }

    /// [`Self::recent_samples`] together with the sampling origin
    pub fn recent_history(&self, count: usize) -> MotionResult<SampleHistory> {
        let count = count.min(N);
        self.with_connected(|state| SampleHistory {
            origin: state.origin,
            samples: (0..count)
                .rev()
                .map(|back| state.store.instant_read(back as u32))
                .collect(),
        })
    }

    /// Samples in the current averaging window
    pub fn running_count(&self) -> MotionResult<u32> {
        self.with_connected(|state| state.store.running_count())
    }

    /// Device clock now. Available while disconnected.
    pub fn current_timestamp(&self) -> u32 {
        self.device_clock().now()
    }

    /// Sequence number the next sample will carry. Available while
    /// disconnected.
    pub fn current_sequence(&self) -> MotionResult<u32> {
        Ok(self.lock()?.next_sequence)
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::config::{MotionConfig, CONTROLLER_V2_PRODUCT_ID, SONY_VENDOR_ID};
    use crate::error::MotionError;
    use crate::hub::MotionHub;
    use crate::ingest::TransportEvent;
    use crate::types::{DeviceAddress, DeviceId, RawSample, SampleOrigin};
    use std::sync::Arc;

    const PAD: DeviceAddress = DeviceAddress { mac0: 0xa, mac1: 0xb };

    fn connected_hub<const N: usize>() -> MotionHub<N> {
        let hub = MotionHub::new(&MotionConfig::default(), Arc::new(ManualClock::new(0)));
        let device = DeviceId::new(SONY_VENDOR_ID, CONTROLLER_V2_PRODUCT_ID);
        hub.handle_event(&TransportEvent::connect(PAD, device)).unwrap();
        hub
    }

    #[test]
    fn test_everything_fails_while_disconnected() {
        let hub: MotionHub = MotionHub::with_system_clock(&MotionConfig::default());
        assert_eq!(hub.reset_sampling(), Err(MotionError::NotConnected));
        assert_eq!(hub.restart_window(), Err(MotionError::NotConnected));
        assert_eq!(hub.sampled_accel_gyro(), Err(MotionError::NotConnected));
        assert_eq!(hub.instant_sample(0), Err(MotionError::NotConnected));
        assert_eq!(hub.recent_samples(4), Err(MotionError::NotConnected));
        assert_eq!(hub.running_count(), Err(MotionError::NotConnected));

        // Clock, counter and origin stay readable
        assert_eq!(hub.current_sequence(), Ok(0));
        assert_eq!(hub.origin(), Ok(SampleOrigin::default()));
        let _ = hub.current_timestamp();
    }

    #[test]
    fn test_single_sample_average_then_fallback() {
        let hub: MotionHub = connected_hub();
        hub.ingest_sample([100, -200, 4000], [0, 0, 0]).unwrap();

        let (accel, gyro) = hub.sampled_accel_gyro().unwrap();
        assert_eq!(accel, [100, -200, 4000]);
        assert_eq!(gyro, [0, 0, 0]);

        // Window drained: second read falls back to the same instant sample
        let reading = hub.sampled_reading().unwrap();
        assert_eq!(reading.averaged, 0);
        assert_eq!((reading.accel, reading.gyro), (accel, gyro));
    }

    #[test]
    fn test_average_of_several_samples() {
        let hub: MotionHub = connected_hub();
        hub.ingest_sample([10, 0, -5], [1, 2, 3]).unwrap();
        hub.ingest_sample([20, 1, -6], [1, 2, 3]).unwrap();
        hub.ingest_sample([31, 1, -6], [4, 2, 3]).unwrap();

        let reading = hub.sampled_reading().unwrap();
        assert_eq!(reading.averaged, 3);
        // 61/3 = 20, 2/3 = 0, -17/3 = -5, 6/3 = 2
        assert_eq!(reading.accel, [20, 0, -5]);
        assert_eq!(reading.gyro, [2, 2, 3]);
        assert_eq!(reading.sequence, 2);
        assert_eq!(hub.running_count().unwrap(), 0);

        // Fallback is the newest sample, not the old mean
        let (accel, gyro) = hub.sampled_accel_gyro().unwrap();
        assert_eq!(accel, [31, 1, -6]);
        assert_eq!(gyro, [4, 2, 3]);
    }

    #[test]
    fn test_reset_then_fallback_matches_instant() {
        let hub: MotionHub = connected_hub();
        hub.ingest_sample([1, 2, 3], [4, 5, 6]).unwrap();
        hub.ingest_sample([7, 8, 9], [10, 11, 12]).unwrap();
        hub.reset_sampling().unwrap();

        let instant = hub.instant_sample(0).unwrap();
        let (accel, gyro) = hub.sampled_accel_gyro().unwrap();
        assert_eq!((accel, gyro), (instant.accel, instant.gyro));
    }

    #[test]
    fn test_restart_window_anchors_at_newest_sample() {
        let hub: MotionHub = connected_hub();
        hub.ingest_sample([1, 1, 1], [0, 0, 0]).unwrap();
        hub.ingest_sample([2, 2, 2], [0, 0, 0]).unwrap();

        let origin = hub.restart_window().unwrap();
        let newest = hub.instant_sample(0).unwrap();
        assert_eq!(origin, SampleOrigin::new(newest.timestamp, newest.sequence));
        assert_eq!(hub.running_count().unwrap(), 0);

        // Fallback reading and its origin come from the same critical section
        let reading = hub.sampled_reading().unwrap();
        assert_eq!(reading.origin, origin);
        assert_eq!(reading.origin.relative(reading.timestamp, reading.sequence), (0, 0));

        let history = hub.recent_history(2).unwrap();
        assert_eq!(history.origin, origin);
        assert_eq!(history.samples.len(), 2);
    }

    #[test]
    fn test_indexed_reads_do_not_drain_window() {
        let hub: MotionHub = connected_hub();
        for i in 0..5 {
            hub.ingest_sample([i, i, i], [0, 0, 0]).unwrap();
        }
        assert_eq!(hub.instant_sample(2).unwrap().accel, [2, 2, 2]);
        assert_eq!(hub.running_count().unwrap(), 5);
    }

    #[test]
    fn test_recent_samples_oldest_first() {
        let hub: MotionHub<4> = connected_hub();
        for i in 0..6i16 {
            hub.ingest_sample([i, 0, 0], [0, 0, 0]).unwrap();
        }

        let recent = hub.recent_samples(3).unwrap();
        let seqs: Vec<u32> = recent.iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![3, 4, 5]);

        // Capped at capacity
        assert_eq!(hub.recent_samples(100).unwrap().len(), 4);
    }

    #[test]
    fn test_capacity_four_wrap_example() {
        let hub: MotionHub<4> = connected_hub();
        let mut appended = Vec::new();
        for i in 0..6i16 {
            hub.ingest_sample([i, -i, 2 * i], [i, i, i]).unwrap();
            appended.push(hub.instant_sample(0).unwrap());
        }

        assert_eq!(hub.instant_sample(0).unwrap(), appended[5]);
        assert_eq!(hub.instant_sample(3).unwrap(), appended[2]);
        assert_eq!(hub.instant_sample(4).unwrap(), appended[5]);
    }

    #[test]
    fn test_instant_only_hub() {
        let hub: MotionHub<1> = connected_hub();
        hub.ingest_sample([1, 1, 1], [1, 1, 1]).unwrap();
        hub.ingest_sample([3, 3, 3], [3, 3, 3]).unwrap();

        assert_eq!(hub.instant_sample(0).unwrap().accel, [3, 3, 3]);
        assert_eq!(hub.instant_sample(17).unwrap().accel, [3, 3, 3]);
        // Averaging still spans both samples
        assert_eq!(hub.sampled_accel_gyro().unwrap().0, [2, 2, 2]);
    }

    #[test]
    fn test_fresh_connection_reads_zero_sample() {
        let hub: MotionHub = connected_hub();
        assert_eq!(hub.instant_sample(0).unwrap(), RawSample::default());
        let reading = hub.sampled_reading().unwrap();
        assert_eq!(reading.accel, [0, 0, 0]);
        assert_eq!(reading.averaged, 0);
    }

    #[test]
    fn test_concurrent_producer_and_consumer() {
        let hub: MotionHub = connected_hub();
        const SAMPLES: usize = 2_000;

        crossbeam::scope(|scope| {
            scope.spawn(|_| {
                for _ in 0..SAMPLES {
                    hub.ingest_sample([250, -250, 8192], [11, -11, 0]).unwrap();
                }
            });

            scope.spawn(|_| {
                let mut total = 0u64;
                for _ in 0..SAMPLES {
                    let reading = hub.sampled_reading().unwrap();
                    total += u64::from(reading.averaged);
                    // Every sample is identical, so any mean or fallback is too,
                    // unless nothing has arrived yet
                    if reading.sequence > 0 || reading.averaged > 0 {
                        assert_eq!(reading.accel, [250, -250, 8192]);
                        assert_eq!(reading.gyro, [11, -11, 0]);
                    }
                }
                assert!(total <= SAMPLES as u64);
            });
        })
        .unwrap();

        assert_eq!(hub.current_sequence().unwrap(), SAMPLES as u32);
        assert_eq!(hub.instant_sample(0).unwrap().sequence, SAMPLES as u32 - 1);
    }
}
