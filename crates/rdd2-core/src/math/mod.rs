//! Rotation-group utilities
//!
//! Implements the orientation representations consumed by the control laws:
//! quaternions, body 3-2-1 Euler angles, their group operations and the
//! thrust/heading frame construction.

pub mod quaternion;
pub mod euler;
pub mod orientation;
pub mod rotation;

pub use quaternion::*;
pub use euler::*;
pub use orientation::*;
pub use rotation::*;

use std::f64::consts::PI;

/// Degrees to radians
pub const DEG2RAD: f64 = PI / 180.0;
