pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One inertial reading as delivered by the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    pub accel: RawTriple,
    pub gyro: RawTriple,
    /// Device clock at capture, wraps at 2^32
    pub timestamp: u32,
    /// Per-connection sample counter, wraps at 2^32
    pub sequence: u32,
}

impl RawSample {
    pub fn new(accel: RawTriple, gyro: RawTriple, timestamp: u32, sequence: u32) -> Self {
        Self {
            accel,
            gyro,
            timestamp,
            sequence,
        }
    }
}

/// Two-part wireless address of a paired controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceAddress {
    pub mac0: u32,
    pub mac1: u32,
}

impl DeviceAddress {
    pub fn new(mac0: u32, mac1: u32) -> Self {
        Self { mac0, mac1 }
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{:08x}", self.mac0, self.mac1)
    }
}

/// USB-style vendor/product identity reported by the transport at pairing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceId {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

/// Connection flag plus the identity of the controller that owns the link
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected(DeviceAddress),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    /// Address of the paired controller, if any
    pub fn address(&self) -> Option<DeviceAddress> {
        match self {
            ConnectionState::Connected(address) => Some(*address),
            ConnectionState::Disconnected => None,
        }
    }
}

/// Synthesized motion state handed to consumers.
///
/// Built fresh on every query, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Acceleration in g, consumer axes
    pub acceleration: [f32; 3],
    /// Angular velocity in rad/s, consumer axes
    pub angular_velocity: [f32; 3],
    /// Orientation quaternion as (x, y, z, w)
    pub orientation: [f32; 4],
    /// Row-major 4x4 rotation matrix derived from `orientation`
    pub rotation_matrix: [f32; MATRIX_ELEMENTS],
    /// Dominant gravity axis as -1/0/+1 per slot
    pub basic_orientation: [f32; 3],
    /// Device clock relative to the sampling origin
    pub timestamp: u32,
    /// Sample counter relative to the sampling origin
    pub sequence: u32,
}

/// One historical record of scaled sensor data
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub accelerometer: [f32; 3],
    pub gyro: [f32; 3],
    pub timestamp: u32,
    pub sequence: u32,
}

/// Device time and sequence that consumer-facing counters are relative to.
///
/// Anchored at a stored sample, so the sample it was taken from reads as
/// (0, 0) and nothing newer can precede it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleOrigin {
    pub timestamp: u32,
    pub sequence: u32,
}

impl SampleOrigin {
    pub fn new(timestamp: u32, sequence: u32) -> Self {
        Self {
            timestamp,
            sequence,
        }
    }

    /// Counters relative to the origin.
    ///
    /// The timestamp wraps with the device clock. A sample whose sequence
    /// precedes the origin is history from before sampling started and
    /// reads as the origin itself.
    pub fn relative(&self, timestamp: u32, sequence: u32) -> (u32, u32) {
        if sequence < self.sequence {
            return (0, 0);
        }
        (
            timestamp.wrapping_sub(self.timestamp),
            sequence - self.sequence,
        )
    }
}

/// Output of an averaged read, taken under a single lock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledReading {
    pub accel: RawTriple,
    pub gyro: RawTriple,
    /// Timestamp of the newest sample in the store
    pub timestamp: u32,
    /// Sequence of the newest sample in the store
    pub sequence: u32,
    /// Samples averaged; 0 means the instant fallback was used
    pub averaged: u32,
    /// Sampling origin in effect for this read
    pub origin: SampleOrigin,
}

/// The newest stored samples, oldest first, with the origin they were read
/// against
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleHistory {
    pub origin: SampleOrigin,
    pub samples: Vec<RawSample>,
}
