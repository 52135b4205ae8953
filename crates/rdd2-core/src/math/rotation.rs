//! SO(3) frame construction
//!
//! Builds rotation matrices from a desired body z-axis (thrust direction) and
//! a heading, the inversion at the heart of the position loop.

use crate::sym::{Expr, SMat3, SVec, SVec3};

/// Horizontal unit vector `[cos(yaw), sin(yaw), 0]` in world frame
pub fn heading_axis(yaw: &Expr) -> SVec3 {
    SVec::new([yaw.cos(), yaw.sin(), Expr::zero()])
}

/// `v / n`, or `fallback` when `n` does not exceed `epsilon`
pub fn normalize_or(v: &SVec3, n: &Expr, epsilon: f64, fallback: &SVec3) -> SVec3 {
    SVec::select(&n.gt(&Expr::constant(epsilon)), &(v / n), fallback)
}

/// Rotation matrix whose z-axis is aligned with `thrust`
///
/// The x-axis is the projection of the heading direction `yaw` onto the plane
/// orthogonal to z. When the thrust is horizontal along the heading, y_B is
/// taken from the horizontal axis perpendicular to the thrust instead, which
/// keeps the frame orthonormal for every heading. World x remains the last
/// resort should that product vanish too.
/// ```text
/// z_B = T / |T|                  (world z when |T| <= epsilon)
/// y_B = normalize(z_B × x_C)     (normalize(z_B × ẑ_W) when z_B ∥ x_C)
/// x_B = y_B × z_B
/// R   = [x_B  y_B  z_B]
/// ```
///
/// # Arguments
/// * `thrust` - Desired thrust vector (world frame)
/// * `thrust_norm` - `|thrust|`, shared with the caller's thrust output
/// * `yaw` - Desired heading [rad]
/// * `epsilon` - Norm below which the fallback axes are used
pub fn frame_from_thrust_and_heading(
    thrust: &SVec3,
    thrust_norm: &Expr,
    yaw: &Expr,
    epsilon: f64,
) -> SMat3 {
    let z_b = normalize_or(thrust, thrust_norm, epsilon, &SVec3::z_axis());

    let side = z_b.cross(&SVec3::z_axis());
    let side = normalize_or(&side, &side.norm(), epsilon, &SVec3::x_axis());

    let y = z_b.cross(&heading_axis(yaw));
    let y_b = normalize_or(&y, &y.norm(), epsilon, &side);

    // z_B ⊥ y_B in both branches
    let x_b = y_b.cross(&z_b);

    SMat3::from_columns([x_b, y_b, z_b])
}
