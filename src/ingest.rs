//! Ingestion gate: transport events in, raw samples out.
//!
//! The transport collaborator calls [`MotionHub::handle_event`] for every
//! wireless event it sees. Only three kinds matter: a connect from an
//! accepted controller, a disconnect from the paired one, and a report from
//! the paired one carrying a full sensor payload. Everything else is
//! ignored, and a truncated report is dropped without surfacing an error.

use crate::error::MotionResult;
use crate::hub::{HubState, MotionHub};
use crate::report::{ReportKind, SensorReport};
use crate::types::{ConnectionState, DeviceAddress, DeviceId, RawSample, RawTriple, SampleOrigin};

/// What happened on the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<'a> {
    /// A device finished pairing; the transport reports its identity
    Connect(DeviceId),
    Disconnect,
    /// An input report is ready to read
    ReportReady(&'a [u8]),
    /// The transport released the last report buffer
    ReportConsumed,
}

/// One event from the transport collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportEvent<'a> {
    pub address: DeviceAddress,
    pub kind: EventKind<'a>,
}

impl<'a> TransportEvent<'a> {
    pub fn connect(address: DeviceAddress, device: DeviceId) -> Self {
        Self {
            address,
            kind: EventKind::Connect(device),
        }
    }

    pub fn disconnect(address: DeviceAddress) -> Self {
        Self {
            address,
            kind: EventKind::Disconnect,
        }
    }

    pub fn report(address: DeviceAddress, buf: &'a [u8]) -> Self {
        Self {
            address,
            kind: EventKind::ReportReady(buf),
        }
    }

    pub fn consumed(address: DeviceAddress) -> Self {
        Self {
            address,
            kind: EventKind::ReportConsumed,
        }
    }
}

/// Why an event had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Connect from an identity that is not in the accepted list
    UnrecognizedDevice,
    /// Connect while another controller holds the link
    AlreadyPaired,
    /// Event for an address other than the paired controller (or none)
    NotPaired,
    /// Report with a different tag
    OtherReport(u8),
    /// Sensor-tagged report too short to decode, or an empty buffer
    Malformed,
    /// Event carries nothing for the motion core
    NoPayload,
}

/// Result of feeding one event through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Connected,
    Disconnected,
    /// A sample was stored with this sequence number
    Sampled(u32),
    Ignored(IgnoreReason),
}

impl<const N: usize> MotionHub<N> {
    /// Feed one transport event into the core
    pub fn handle_event(&self, event: &TransportEvent<'_>) -> MotionResult<IngestOutcome> {
        match event.kind {
            EventKind::Connect(device) => self.on_connect(event.address, device),
            EventKind::Disconnect => self.on_disconnect(event.address),
            EventKind::ReportReady(buf) => self.on_report(event.address, buf),
            EventKind::ReportConsumed => Ok(IngestOutcome::Ignored(IgnoreReason::NoPayload)),
        }
    }

    /// Store one already-decoded sample, stamped with the device clock and
    /// the next sequence number. Rejected with `NotConnected` while no
    /// device is paired.
    pub fn ingest_sample(&self, accel: RawTriple, gyro: RawTriple) -> MotionResult<u32> {
        self.with_connected(|state| self.record(state, accel, gyro))
    }

    fn on_connect(&self, address: DeviceAddress, device: DeviceId) -> MotionResult<IngestOutcome> {
        if !self.accepts(&device) {
            log::debug!(
                "Ignoring connect from {} ({:04x}:{:04x}): not an accepted controller",
                address,
                device.vendor_id,
                device.product_id
            );
            return Ok(IngestOutcome::Ignored(IgnoreReason::UnrecognizedDevice));
        }

        let mut state = self.lock()?;
        if let ConnectionState::Connected(paired) = state.connection {
            log::debug!("Ignoring connect from {}: {} already paired", address, paired);
            return Ok(IngestOutcome::Ignored(IgnoreReason::AlreadyPaired));
        }

        // Reset before the flag flips so no reader sees stale history as live
        let now = self.device_clock().now();
        state.store.clear(now);
        state.next_sequence = 0;
        state.origin = SampleOrigin::new(now, 0);
        state.connection = ConnectionState::Connected(address);
        drop(state);

        log::info!("Controller {} connected", address);
        Ok(IngestOutcome::Connected)
    }

    fn on_disconnect(&self, address: DeviceAddress) -> MotionResult<IngestOutcome> {
        let mut state = self.lock()?;
        if state.connection.address() != Some(address) {
            log::debug!("Ignoring disconnect from unpaired device {}", address);
            return Ok(IngestOutcome::Ignored(IgnoreReason::NotPaired));
        }

        state.connection = ConnectionState::Disconnected;
        drop(state);

        log::info!("Controller {} disconnected", address);
        Ok(IngestOutcome::Disconnected)
    }

    fn on_report(&self, address: DeviceAddress, buf: &[u8]) -> MotionResult<IngestOutcome> {
        let report = match SensorReport::classify(buf) {
            ReportKind::Sensor(report) => report,
            ReportKind::Other(tag) => {
                return Ok(IngestOutcome::Ignored(IgnoreReason::OtherReport(tag)));
            }
            ReportKind::Truncated(len) => {
                log::debug!("Dropping truncated sensor report from {} ({} bytes)", address, len);
                return Ok(IngestOutcome::Ignored(IgnoreReason::Malformed));
            }
            ReportKind::Empty => return Ok(IngestOutcome::Ignored(IgnoreReason::Malformed)),
        };

        let mut state = self.lock()?;
        if state.connection.address() != Some(address) {
            return Ok(IngestOutcome::Ignored(IgnoreReason::NotPaired));
        }

        let sequence = self.record(&mut state, report.accel, report.gyro);
        Ok(IngestOutcome::Sampled(sequence))
    }

    fn record(&self, state: &mut HubState<N>, accel: RawTriple, gyro: RawTriple) -> u32 {
        let sequence = state.next_sequence;
        let sample = RawSample::new(accel, gyro, self.device_clock().now(), sequence);
        state.store.append(sample);
        state.next_sequence = sequence.wrapping_add(1);

        log::trace!("Sample {} accel={:?} gyro={:?}", sequence, accel, gyro);
        sequence
    }
}
