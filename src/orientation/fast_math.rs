//! Parabola-based trigonometry.
//!
//! Cheap approximations for the constrained target. `fast_sin`/`fast_cos`
//! stay within about 0.1% of full scale over [-π, π]; `fast_atan2` within
//! about 0.002 rad.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

const SIN_B: f32 = 4.0 / PI;
const SIN_C: f32 = -4.0 / (PI * PI);
const SIN_P: f32 = 0.225;

const ATAN_A: f32 = 0.2447;
const ATAN_B: f32 = 0.0663;

/// Wrap an angle into [-π, π]
pub fn wrap_angle(x: f32) -> f32 {
    let x = x % TAU;
    if x > PI {
        x - TAU
    } else if x < -PI {
        x + TAU
    } else {
        x
    }
}

pub fn fast_sin(x: f32) -> f32 {
    let x = wrap_angle(x);
    let y = SIN_B * x + SIN_C * x * x.abs();
    // Second parabola pass pulls the error down from ~5% to ~0.1%
    SIN_P * (y * y.abs() - y) + y
}

pub fn fast_cos(x: f32) -> f32 {
    fast_sin(x + FRAC_PI_2)
}

pub fn fast_atan2(y: f32, x: f32) -> f32 {
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }

    if x.abs() >= y.abs() {
        let a = atan_unit(y / x);
        if x >= 0.0 {
            a
        } else if y >= 0.0 {
            a + PI
        } else {
            a - PI
        }
    } else {
        let a = atan_unit(x / y);
        if y > 0.0 {
            FRAC_PI_2 - a
        } else {
            -FRAC_PI_2 - a
        }
    }
}

/// atan over [-1, 1]
fn atan_unit(z: f32) -> f32 {
    let abs_z = z.abs();
    FRAC_PI_4 * z - z * (abs_z - 1.0) * (ATAN_A + ATAN_B * abs_z)
}
