//! Orientation synthesis: raw controller triples to a consumer motion state.
//!
//! The pipeline is stateless apart from the sampling origin the caller
//! passes in:
//!
//! 1. remap controller axes onto the console's axes ([`ACCEL_AXES`],
//!    [`GYRO_AXES`])
//! 2. scale to g and rad/s by the shared full-scale divisor
//! 3. classify the dominant gravity axis
//! 4. derive a quaternion from normalized gravity with the selected
//!    [`OrientationStrategy`], or identity below [`FREE_FALL_EPSILON`]
//! 5. build the rotation matrix from that quaternion, never independently

pub mod fast_math;
pub mod strategy;

pub use strategy::{CrossProduct, EulerAngles, OrientationMethod, OrientationStrategy};

use crate::types::{
    Mat4, MotionState, Quat, RawSample, RawTriple, SampleOrigin, SensorState, Vec3, AXIS_COUNT,
    MATRIX_ELEMENTS,
};
use nalgebra::UnitQuaternion;
use std::f32::consts::PI;

/// Raw units per g, and per π rad/s for the gyro
pub const FULL_SCALE: f32 = 8192.0;

/// Below this acceleration magnitude (in g) gravity direction is unknown
pub const FREE_FALL_EPSILON: f32 = 0.001;

/// Signed axis permutation from controller axes to console axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    /// Controller axis feeding each console axis
    pub source: [usize; AXIS_COUNT],
    pub sign: [f32; AXIS_COUNT],
}

impl AxisMap {
    pub fn apply(&self, raw: &RawTriple) -> Vec3 {
        Vec3::from_fn(|axis, _| self.sign[axis] * f32::from(raw[self.source[axis]]))
    }
}

/// Console x = controller x, y = -z, z = -y
pub const ACCEL_AXES: AxisMap = AxisMap {
    source: [0, 2, 1],
    sign: [1.0, -1.0, -1.0],
};

/// Console x = controller x, y = z, z = y
pub const GYRO_AXES: AxisMap = AxisMap {
    source: [0, 2, 1],
    sign: [1.0, 1.0, 1.0],
};

/// Acceleration in g, console axes
pub fn scale_accel(raw: &RawTriple) -> Vec3 {
    ACCEL_AXES.apply(raw) / FULL_SCALE
}

/// Angular velocity in rad/s, console axes
pub fn scale_gyro(raw: &RawTriple) -> Vec3 {
    GYRO_AXES.apply(raw) * (PI / FULL_SCALE)
}

/// Sign of the dominant component in its own slot, zero elsewhere.
/// Ties go to the lowest console axis: x, then y, then z.
pub fn basic_orientation(acceleration: &Vec3) -> [f32; 3] {
    let mut dominant = 0;
    for axis in 1..AXIS_COUNT {
        if acceleration[axis].abs() > acceleration[dominant].abs() {
            dominant = axis;
        }
    }

    let mut out = [0.0f32; 3];
    out[dominant] = sign(acceleration[dominant]);
    out
}

fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Orientation from acceleration, identity when it is too small to trust
pub fn orientation_from_accel(strategy: &dyn OrientationStrategy, acceleration: &Vec3) -> Quat {
    let magnitude = acceleration.norm();
    if magnitude <= FREE_FALL_EPSILON {
        return Quat::identity();
    }
    strategy.orientation(&(acceleration / magnitude))
}

/// Rotation matrix of `q` after normalizing by its squared norm
pub fn rotation_matrix(q: &Quat) -> Mat4 {
    if q.norm_squared() == 0.0 {
        return Mat4::identity();
    }
    UnitQuaternion::from_quaternion(*q).to_homogeneous()
}

/// Row-major flattening of a 4x4 matrix
pub fn row_major(m: &Mat4) -> [f32; MATRIX_ELEMENTS] {
    let mut out = [0.0f32; MATRIX_ELEMENTS];
    // nalgebra stores column-major; the transpose's storage is row-major
    for (slot, value) in out.iter_mut().zip(m.transpose().iter()) {
        *slot = *value;
    }
    out
}

/// Full synthesis of one accel/gyro pair
pub fn synthesize(
    strategy: &dyn OrientationStrategy,
    accel: &RawTriple,
    gyro: &RawTriple,
    origin: SampleOrigin,
    timestamp: u32,
    sequence: u32,
) -> MotionState {
    let acceleration = scale_accel(accel);
    let angular_velocity = scale_gyro(gyro);
    let q = orientation_from_accel(strategy, &acceleration);
    let (timestamp, sequence) = origin.relative(timestamp, sequence);

    MotionState {
        acceleration: acceleration.into(),
        angular_velocity: angular_velocity.into(),
        orientation: [q.i, q.j, q.k, q.w],
        rotation_matrix: row_major(&rotation_matrix(&q)),
        basic_orientation: basic_orientation(&acceleration),
        timestamp,
        sequence,
    }
}

/// Scaled, origin-relative copy of one stored sample
pub fn sensor_state(sample: &RawSample, origin: SampleOrigin) -> SensorState {
    let (timestamp, sequence) = origin.relative(sample.timestamp, sample.sequence);
    SensorState {
        accelerometer: scale_accel(&sample.accel).into(),
        gyro: scale_gyro(&sample.gyro).into(),
        timestamp,
        sequence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const IDENTITY: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    const ALL_METHODS: [OrientationMethod; 2] =
        [OrientationMethod::CrossProduct, OrientationMethod::EulerAngles];

    /// Textbook quaternion-to-matrix, row-major, normalized by |q|^2
    fn reference_matrix(q: [f32; 4]) -> [f32; 16] {
        let [x, y, z, w] = q;
        let n = 2.0 / (x * x + y * y + z * z + w * w);
        [
            1.0 - n * (y * y + z * z),
            n * (x * y - z * w),
            n * (x * z + y * w),
            0.0,
            n * (x * y + z * w),
            1.0 - n * (x * x + z * z),
            n * (y * z - x * w),
            0.0,
            n * (x * z - y * w),
            n * (y * z + x * w),
            1.0 - n * (x * x + y * y),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ]
    }

    #[test]
    fn test_axis_remap_and_scale() {
        let a = scale_accel(&[8192, 4096, -8192]);
        assert_abs_diff_eq!(a.x, 1.0);
        assert_abs_diff_eq!(a.y, 1.0);
        assert_abs_diff_eq!(a.z, -0.5);

        let g = scale_gyro(&[8192, -4096, 0]);
        assert_abs_diff_eq!(g.x, PI, epsilon = 1e-6);
        assert_abs_diff_eq!(g.y, 0.0);
        assert_abs_diff_eq!(g.z, -PI / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_basic_orientation_dominant_axis() {
        assert_eq!(basic_orientation(&Vec3::new(0.1, -0.2, -0.9)), [0.0, 0.0, -1.0]);
        assert_eq!(basic_orientation(&Vec3::new(0.7, -0.2, 0.1)), [1.0, 0.0, 0.0]);
        assert_eq!(basic_orientation(&Vec3::new(0.0, -0.5, 0.1)), [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_basic_orientation_ties_and_zero() {
        assert_eq!(basic_orientation(&Vec3::new(0.5, -0.5, 0.5)), [1.0, 0.0, 0.0]);
        assert_eq!(basic_orientation(&Vec3::new(0.1, -0.6, 0.6)), [0.0, -1.0, 0.0]);
        assert_eq!(basic_orientation(&Vec3::zeros()), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_free_fall_yields_identity() {
        let gyros: [RawTriple; 3] = [[0, 0, 0], [1000, -2000, 3000], [i16::MAX, i16::MIN, 7]];
        for method in ALL_METHODS {
            for gyro in &gyros {
                // 5 raw units is ~0.0006 g
                let state = synthesize(
                    method.strategy(),
                    &[3, -2, 4],
                    gyro,
                    SampleOrigin::default(),
                    0,
                    0,
                );
                assert_eq!(state.orientation, [0.0, 0.0, 0.0, 1.0]);
                assert_eq!(state.rotation_matrix, IDENTITY);
            }
        }
    }

    #[test]
    fn test_matrix_matches_quaternion() {
        let accels: [RawTriple; 5] = [
            [0, 0, 8192],
            [1200, -300, 8000],
            [-4000, 2000, 5000],
            [8192, 0, 0],
            [100, -8192, -900],
        ];
        for method in ALL_METHODS {
            for accel in &accels {
                let state =
                    synthesize(method.strategy(), accel, &[0, 0, 0], SampleOrigin::default(), 0, 0);
                let expected = reference_matrix(state.orientation);
                for (got, want) in state.rotation_matrix.iter().zip(expected.iter()) {
                    assert_abs_diff_eq!(*got, *want, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_flat_controller() {
        // Controller y carries gravity when lying flat; console z = -y
        let state = synthesize(
            OrientationMethod::EulerAngles.strategy(),
            &[0, 0, 8192],
            &[0, 0, 0],
            SampleOrigin::default(),
            0,
            0,
        );
        assert_abs_diff_eq!(state.acceleration[1], -1.0);
        assert_eq!(state.basic_orientation, [0.0, -1.0, 0.0]);

        let state = synthesize(
            OrientationMethod::CrossProduct.strategy(),
            &[0, 8192, 0],
            &[0, 0, 0],
            SampleOrigin::default(),
            0,
            0,
        );
        assert_abs_diff_eq!(state.acceleration[2], -1.0);
        assert_eq!(state.basic_orientation, [0.0, 0.0, -1.0]);
        assert_eq!(state.orientation, [0.0, 0.0, 0.0, 1.0]);
        for (got, want) in state.rotation_matrix.iter().zip(IDENTITY.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_relative_counters_wrap() {
        let origin = SampleOrigin::new(u32::MAX - 9, 5);
        let state = synthesize(
            OrientationMethod::EulerAngles.strategy(),
            &[0, 8192, 0],
            &[0, 0, 0],
            origin,
            10,
            8,
        );
        assert_eq!(state.timestamp, 20);
        assert_eq!(state.sequence, 3);
    }

    #[test]
    fn test_sensor_state_scaling() {
        let sample = RawSample::new([0, 8192, 0], [8192, 0, 0], 1_500, 12);
        let state = sensor_state(&sample, SampleOrigin::new(1_000, 10));
        assert_eq!(state.accelerometer, [0.0, 0.0, -1.0]);
        assert_abs_diff_eq!(state.gyro[0], PI, epsilon = 1e-6);
        assert_eq!((state.timestamp, state.sequence), (500, 2));
    }

    #[test]
    fn test_strategies_agree_for_small_tilt() {
        // ~3 degrees of roll
        let accel = [0, 8180, 430];
        let cross = synthesize(
            OrientationMethod::CrossProduct.strategy(),
            &accel,
            &[0, 0, 0],
            SampleOrigin::default(),
            0,
            0,
        );
        let euler = synthesize(
            OrientationMethod::EulerAngles.strategy(),
            &accel,
            &[0, 0, 0],
            SampleOrigin::default(),
            0,
            0,
        );
        // Cross-product encodes the full angle, Euler the half angle
        assert_abs_diff_eq!(cross.orientation[0], 2.0 * euler.orientation[0], epsilon = 0.003);
        assert_eq!(cross.basic_orientation, euler.basic_orientation);
    }
}
