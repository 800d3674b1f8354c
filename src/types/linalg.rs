//! Linear algebra aliases for the orientation pipeline
//!
//! Everything downstream of the raw integer samples runs in `f32`, the
//! precision the console motion API reports in.

use nalgebra::{Matrix4, Quaternion, SVector};

// ===== Dimensions =====
pub const AXIS_COUNT: usize = 3;
pub const MATRIX_ELEMENTS: usize = 16;

pub type Vec3 = SVector<f32, AXIS_COUNT>;
pub type Quat = Quaternion<f32>;
pub type Mat4 = Matrix4<f32>;

/// Raw sensor triple in device units
pub type RawTriple = [i16; AXIS_COUNT];
