//! Shared state between the transport path and the consumer path.
//!
//! One mutex guards the connection flag, the sample store and the sequence
//! counter together. A reader therefore never sees the flag and the store
//! out of step: connect clears the store, moves the sampling origin and flips
//! the flag inside the same critical section, disconnect flips the flag and
//! leaves history alone.
//! Every critical section is O(1) apart from the history copy on connect.

use crate::clock::{DeviceClock, SystemClock};
use crate::config::MotionConfig;
use crate::error::{MotionError, MotionResult};
use crate::store::{SampleStore, HISTORY_LEN};
use crate::types::{ConnectionState, DeviceId, SampleOrigin};
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) struct HubState<const N: usize> {
    pub(crate) connection: ConnectionState,
    pub(crate) store: SampleStore<N>,
    /// Sequence number the next ingested sample will carry
    pub(crate) next_sequence: u32,
    /// Zero point for consumer-facing timestamps and sequences
    pub(crate) origin: SampleOrigin,
}

/// Owner of the sample store and connection state.
///
/// Shared by reference (usually `Arc`) between the ingestion side
/// (`ingest.rs`) and the query side (`query.rs`).
pub struct MotionHub<const N: usize = HISTORY_LEN> {
    state: Mutex<HubState<N>>,
    clock: Arc<dyn DeviceClock>,
    config: MotionConfig,
}

impl<const N: usize> MotionHub<N> {
    pub fn new(config: &MotionConfig, clock: Arc<dyn DeviceClock>) -> Self {
        MotionHub {
            state: Mutex::new(HubState {
                connection: ConnectionState::Disconnected,
                store: SampleStore::new(),
                next_sequence: 0,
                origin: SampleOrigin::default(),
            }),
            clock,
            config: config.clone(),
        }
    }

    pub fn with_system_clock(config: &MotionConfig) -> Self {
        Self::new(config, Arc::new(SystemClock::new()))
    }

    pub(crate) fn lock(&self) -> MotionResult<MutexGuard<'_, HubState<N>>> {
        self.state.lock().map_err(|_| {
            MotionError::Internal("Failed to acquire motion hub lock".to_string())
        })
    }

    /// Run `f` under the lock if a device is paired, else `NotConnected`
    pub(crate) fn with_connected<T>(
        &self,
        f: impl FnOnce(&mut HubState<N>) -> T,
    ) -> MotionResult<T> {
        let mut state = self.lock()?;
        if !state.connection.is_connected() {
            return Err(MotionError::NotConnected);
        }
        Ok(f(&mut *state))
    }

    pub(crate) fn device_clock(&self) -> &dyn DeviceClock {
        self.clock.as_ref()
    }

    pub(crate) fn accepts(&self, device: &DeviceId) -> bool {
        self.config.accepts(device)
    }

    /// Snapshot of the connection flag and paired identity
    pub fn connection(&self) -> MotionResult<ConnectionState> {
        Ok(self.lock()?.connection)
    }

    pub fn is_connected(&self) -> bool {
        self.connection().map(|c| c.is_connected()).unwrap_or(false)
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
