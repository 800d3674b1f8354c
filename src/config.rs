use crate::error::{MotionError, MotionResult};
use crate::orientation::OrientationMethod;
use crate::types::DeviceId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sony vendor ID
pub const SONY_VENDOR_ID: u16 = 0x054C;
/// First-revision controller product ID
pub const CONTROLLER_PRODUCT_ID: u16 = 0x05C4;
/// Second-revision controller product ID
pub const CONTROLLER_V2_PRODUCT_ID: u16 = 0x09CC;

/// Runtime configuration for the motion core.
///
/// Missing fields fall back to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Orientation derivation used by the motion service
    pub orientation: OrientationMethod,
    /// Identities allowed to pair. Empty accepts any device.
    pub accepted_devices: Vec<DeviceId>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            orientation: OrientationMethod::default(),
            accepted_devices: vec![
                DeviceId::new(SONY_VENDOR_ID, CONTROLLER_PRODUCT_ID),
                DeviceId::new(SONY_VENDOR_ID, CONTROLLER_V2_PRODUCT_ID),
            ],
        }
    }
}

impl MotionConfig {
    pub fn from_json_str(json: &str) -> MotionResult<Self> {
        serde_json::from_str(json).map_err(|e| MotionError::InvalidConfig(e.to_string()))
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MotionError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether a device with this identity may pair
    pub fn accepts(&self, device: &DeviceId) -> bool {
        self.accepted_devices.is_empty() || self.accepted_devices.contains(device)
    }
}
