use super::fast_math::{fast_atan2, fast_cos, fast_sin};
use crate::types::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derives an orientation quaternion from a unit gravity vector
pub trait OrientationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `gravity` is the normalized acceleration in consumer axes
    fn orientation(&self, gravity: &Vec3) -> Quat;
}

/// Gravity direction of a device lying flat, in consumer axes
pub fn reference_down() -> Vec3 {
    Vec3::new(0.0, 0.0, -1.0)
}

/// Quaternion vector part = down × gravity, scalar part = down · gravity.
///
/// Only meaningful for small tilts; the result is not renormalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossProduct;

impl OrientationStrategy for CrossProduct {
    fn name(&self) -> &'static str {
        "cross_product"
    }

    fn orientation(&self, gravity: &Vec3) -> Quat {
        let down = reference_down();
        let axis = down.cross(gravity);
        Quat::new(down.dot(gravity), axis.x, axis.y, axis.z)
    }
}

/// Roll and pitch from gravity with yaw pinned at zero, converted through
/// half-angle products. Uses the approximate trigonometry in `fast_math`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerAngles;

impl EulerAngles {
    /// (roll about x, pitch about y) in radians
    pub fn roll_pitch(gravity: &Vec3) -> (f32, f32) {
        let roll = fast_atan2(gravity.y, -gravity.z);
        let pitch = fast_atan2(
            -gravity.x,
            (gravity.y * gravity.y + gravity.z * gravity.z).sqrt(),
        );
        (roll, pitch)
    }
}

impl OrientationStrategy for EulerAngles {
    fn name(&self) -> &'static str {
        "euler_angles"
    }

    fn orientation(&self, gravity: &Vec3) -> Quat {
        let (roll, pitch) = Self::roll_pitch(gravity);
        let yaw = 0.0f32;

        let (sr, cr) = (fast_sin(roll * 0.5), fast_cos(roll * 0.5));
        let (sp, cp) = (fast_sin(pitch * 0.5), fast_cos(pitch * 0.5));
        let (sy, cy) = (fast_sin(yaw * 0.5), fast_cos(yaw * 0.5));

        Quat::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }
}

/// Which orientation derivation the synthesizer runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMethod {
    CrossProduct,
    #[default]
    EulerAngles,
}

static CROSS_PRODUCT: CrossProduct = CrossProduct;
static EULER_ANGLES: EulerAngles = EulerAngles;

impl OrientationMethod {
    pub fn strategy(&self) -> &'static dyn OrientationStrategy {
        match self {
            OrientationMethod::CrossProduct => &CROSS_PRODUCT,
            OrientationMethod::EulerAngles => &EULER_ANGLES,
        }
    }
}

impl fmt::Display for OrientationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

impl FromStr for OrientationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cross_product" | "cross" => Ok(OrientationMethod::CrossProduct),
            "euler_angles" | "euler" => Ok(OrientationMethod::EulerAngles),
            other => Err(format!(
                "unknown orientation method '{}' (expected cross_product or euler_angles)",
                other
            )),
        }
    }
}
