//! Console-facing motion API.
//!
//! Mirrors the calls a game makes against the motion library: start
//! sampling, poll the motion state, pull a short history of sensor
//! records, or ask which face points down.

use crate::error::{MotionError, MotionResult};
use crate::hub::MotionHub;
use crate::orientation::{self, OrientationMethod};
use crate::store::HISTORY_LEN;
use crate::types::{MotionState, SampleOrigin, SensorState};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Bookkeeping for the current sampling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingSession {
    pub session_id: String,
    pub start_time: String,
    pub origin: SampleOrigin,
    pub orientation: OrientationMethod,
}

/// Motion API backed by a shared [`MotionHub`]
pub struct MotionService<const N: usize = HISTORY_LEN> {
    hub: Arc<MotionHub<N>>,
    method: OrientationMethod,
    session: Mutex<Option<SamplingSession>>,
}

impl<const N: usize> MotionService<N> {
    /// Service using the orientation method from the hub's config
    pub fn new(hub: Arc<MotionHub<N>>) -> Self {
        let method = hub.config().orientation;
        Self::with_method(hub, method)
    }

    pub fn with_method(hub: Arc<MotionHub<N>>, method: OrientationMethod) -> Self {
        MotionService {
            hub,
            method,
            session: Mutex::new(None),
        }
    }

    pub fn hub(&self) -> &Arc<MotionHub<N>> {
        &self.hub
    }

    pub fn method(&self) -> OrientationMethod {
        self.method
    }

    fn lock_session(&self) -> MotionResult<std::sync::MutexGuard<'_, Option<SamplingSession>>> {
        self.session.lock().map_err(|_| {
            MotionError::Internal("Failed to acquire service state lock".to_string())
        })
    }

    /// Begin a sampling run: drain the averaging window and make the newest
    /// stored sample the zero point for everything reported after.
    ///
    /// Works without a controller; the hub keeps its origin until the next
    /// connect moves it to the connect time.
    pub fn start_sampling(&self) -> MotionResult<SamplingSession> {
        let origin = match self.hub.restart_window() {
            Ok(origin) => origin,
            Err(MotionError::NotConnected) => self.hub.origin()?,
            Err(e) => return Err(e),
        };

        let now = Utc::now();
        let session = SamplingSession {
            session_id: format!("sampling_{}", now.timestamp_millis()),
            start_time: now.to_rfc3339(),
            origin,
            orientation: self.method,
        };

        *self.lock_session()? = Some(session.clone());

        log::info!(
            "Sampling started ({}, origin t={} seq={})",
            self.method,
            origin.timestamp,
            origin.sequence
        );
        Ok(session)
    }

    /// End the current run. The hub's origin stays in effect so later
    /// queries keep a consistent time base.
    pub fn stop_sampling(&self) -> MotionResult<Option<SamplingSession>> {
        let session = self.lock_session()?.take();
        if let Some(s) = &session {
            log::info!("Sampling {} stopped", s.session_id);
        }
        Ok(session)
    }

    pub fn session(&self) -> MotionResult<Option<SamplingSession>> {
        Ok(self.lock_session()?.clone())
    }

    /// Averaged read run through the orientation pipeline
    pub fn motion_state(&self) -> MotionResult<MotionState> {
        let reading = self.hub.sampled_reading()?;
        Ok(orientation::synthesize(
            self.method.strategy(),
            &reading.accel,
            &reading.gyro,
            reading.origin,
            reading.timestamp,
            reading.sequence,
        ))
    }

    /// The last `count` stored samples as sensor records, oldest first
    pub fn sensor_states(&self, count: usize) -> MotionResult<Vec<SensorState>> {
        let history = self.hub.recent_history(count)?;
        Ok(history
            .samples
            .iter()
            .map(|sample| orientation::sensor_state(sample, history.origin))
            .collect())
    }

    /// Dominant gravity axis of the newest sample. Leaves the averaging
    /// window alone.
    pub fn basic_orientation(&self) -> MotionResult<[f32; 3]> {
        let sample = self.hub.instant_sample(0)?;
        Ok(orientation::basic_orientation(&orientation::scale_accel(&sample.accel)))
    }
}
