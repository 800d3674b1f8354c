// DS Motion core
// Feeds the console motion API from a wireless controller's inertial sensors

pub mod clock;
pub mod config;
pub mod error;
pub mod hub;
pub mod ingest;
pub mod orientation;
mod query;
pub mod report;
pub mod service;
pub mod store;
pub mod types;

pub use clock::{DeviceClock, ManualClock, SystemClock};
pub use config::MotionConfig;
pub use error::{MotionError, MotionResult};
pub use hub::MotionHub;
pub use ingest::{EventKind, IgnoreReason, IngestOutcome, TransportEvent};
pub use orientation::{synthesize, OrientationMethod, OrientationStrategy};
pub use report::SensorReport;
pub use service::{MotionService, SamplingSession};
pub use store::{SampleStore, HISTORY_LEN, INSTANT_ONLY_LEN};
pub use types::{
    ConnectionState, DeviceAddress, DeviceId, MotionState, RawSample, SampleHistory, SampleOrigin,
    SampledReading, SensorState,
};
