//! Position controller
//!
//! Maps trajectory tracking error to a normalised thrust magnitude and an
//! attitude setpoint. The thrust direction fixes the body z-axis and the
//! camera heading fixes the rotation about it.

use nalgebra::{UnitQuaternion, Vector3};

use crate::config::LawConfig;
use crate::error::GraphError;
use crate::math::{
    frame_from_thrust_and_heading, quaternion_from_param, quaternion_to_param, Quat,
};
use crate::sym::{Expr, Function, SVec3, Signal};

pub const NAME: &str = "position_control";

/// `position_control(pt_w, vt_w, at_w, qc_wb, p_w, v_b, q_wb) -> (nT, qr_wb)`
///
/// ```text
/// e_p = p_w - pt_w
/// e_v = R(q_wb)·v_b - vt_w
/// T'  = (-kp·e_p - kv·e_v + at_w) / 2g      capped at |T'| = thrust_norm_max
/// T   = T' + trim·ẑ
/// nT  = |T|
/// qr_wb = frame with z along T and x toward the camera heading
/// ```
pub fn derive(config: &LawConfig) -> Result<Function, GraphError> {
    let pt_w = SVec3::symbol("pt_w");
    let vt_w = SVec3::symbol("vt_w");
    let at_w = SVec3::symbol("at_w");
    let qc_wb = Quat::symbol("qc_wb");
    let p_w = SVec3::symbol("p_w");
    let v_b = SVec3::symbol("v_b");
    let q_wb = Quat::symbol("q_wb");

    let gains = &config.position;
    let two_g = 2.0 * config.gravity;

    let v_w = q_wb.to_matrix().mul_vec(&v_b);
    let e_p = &p_w - &pt_w;
    let e_v = &v_w - &vt_w;

    let correction = &e_p * (-gains.kp / two_g) - &e_v * (gains.kv / two_g) + &at_w / two_g;
    let correction_norm = correction.norm();
    let cap = Expr::select(
        &correction_norm.gt(&Expr::constant(gains.thrust_norm_max)),
        &(gains.thrust_norm_max / &correction_norm),
        &Expr::one(),
    );
    let correction = &correction * &cap;

    let thrust = correction + SVec3::z_axis() * config.thrust.trim;
    let thrust_norm = thrust.norm();

    let camera_yaw = qc_wb.to_euler321().yaw().clone();
    let frame = frame_from_thrust_and_heading(&thrust, &thrust_norm, &camera_yaw, gains.epsilon);
    let qr_wb = Quat::from_matrix(&frame);

    Function::new(
        NAME,
        vec![
            Signal::new("pt_w", &pt_w),
            Signal::new("vt_w", &vt_w),
            Signal::new("at_w", &at_w),
            Signal::new("qc_wb", &qc_wb),
            Signal::new("p_w", &p_w),
            Signal::new("v_b", &v_b),
            Signal::new("q_wb", &q_wb),
        ],
        vec![
            Signal::new("nT", &thrust_norm),
            Signal::new("qr_wb", &qr_wb),
        ],
    )
}

/// Reference point on a trajectory, world frame
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryReference {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
}

impl TrajectoryReference {
    /// Stationary reference at `position`
    pub fn hold(position: Vector3<f64>) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        }
    }
}

/// Estimated vehicle state
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Position, world frame [m]
    pub position: Vector3<f64>,
    /// Velocity, body frame [m/s]
    pub velocity: Vector3<f64>,
    /// Attitude, body to world
    pub orientation: UnitQuaternion<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionOutput {
    /// Normalised thrust magnitude
    pub thrust: f64,
    /// Attitude setpoint for the attitude loop
    pub orientation_ref: UnitQuaternion<f64>,
}

/// Host-side evaluator for [`derive`]
#[derive(Debug, Clone)]
pub struct PositionLaw {
    function: Function,
}

impl PositionLaw {
    pub fn new(config: &LawConfig) -> Result<Self, GraphError> {
        Ok(Self {
            function: derive(config)?,
        })
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// # Arguments
    /// * `reference` - Trajectory point to track
    /// * `camera` - Camera attitude; only its yaw is used
    /// * `state` - Current vehicle state
    ///
    /// The frame construction yields a unit `qr_wb`; the host copy is
    /// renormalised only to absorb rounding.
    pub fn compute(
        &self,
        reference: &TrajectoryReference,
        camera: &UnitQuaternion<f64>,
        state: &VehicleState,
    ) -> Result<PositionOutput, GraphError> {
        let out = self.function.call(&[
            reference.position.as_slice(),
            reference.velocity.as_slice(),
            reference.acceleration.as_slice(),
            &quaternion_to_param(camera),
            state.position.as_slice(),
            state.velocity.as_slice(),
            &quaternion_to_param(&state.orientation),
        ])?;

        let orientation_ref =
            quaternion_from_param(&out[1]).ok_or_else(|| GraphError::ShapeMismatch {
                function: NAME.to_string(),
                port: "qr_wb".to_string(),
                expected: 4,
                found: out[1].len(),
            })?;
        Ok(PositionOutput {
            thrust: out[0][0],
            orientation_ref,
        })
    }
}
