//! Attitude controller
//!
//! Proportional control on the logarithm of the relative rotation between the
//! current and reference attitude. Produces the body rate setpoint for the
//! attitude rate loop.

use nalgebra::{UnitQuaternion, Vector3};

use crate::config::LawConfig;
use crate::error::GraphError;
use crate::math::{quaternion_to_param, Orientation, Quat};
use crate::sym::{Function, SVec, Signal};

pub const NAME: &str = "attitude_control";

/// `attitude_control(q, q_r) -> omega`
///
/// ```text
/// ω = Kp ⊙ log(q⁻¹ ∘ q_r),   Kp = [kp_rp, kp_rp, kp_yaw]
/// ```
///
/// The error is expressed in the body frame. `log` takes the short way round,
/// so `q_r` and `-q_r` give the same command.
pub fn derive(config: &LawConfig) -> Result<Function, GraphError> {
    let q = Orientation::from(Quat::symbol("q"));
    let q_r = Orientation::from(Quat::symbol("q_r"));

    let gains = &config.attitude;
    let kp = SVec::from_f64([gains.kp_rollpitch, gains.kp_rollpitch, gains.kp_yaw]);
    let omega = kp.component_mul(&q.inverse().compose(&q_r).log());

    Function::new(
        NAME,
        vec![Signal::new("q", &q), Signal::new("q_r", &q_r)],
        vec![Signal::new("omega", &omega)],
    )
}

/// Host-side evaluator for [`derive`]
#[derive(Debug, Clone)]
pub struct AttitudeLaw {
    function: Function,
}

impl AttitudeLaw {
    pub fn new(config: &LawConfig) -> Result<Self, GraphError> {
        Ok(Self {
            function: derive(config)?,
        })
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Body rate setpoint [rad/s]
    ///
    /// # Arguments
    /// * `orientation` - Current attitude (body to world)
    /// * `orientation_ref` - Reference attitude (body to world)
    pub fn compute(
        &self,
        orientation: &UnitQuaternion<f64>,
        orientation_ref: &UnitQuaternion<f64>,
    ) -> Result<Vector3<f64>, GraphError> {
        let out = self.function.call(&[
            &quaternion_to_param(orientation),
            &quaternion_to_param(orientation_ref),
        ])?;
        Ok(Vector3::from_column_slice(&out[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_attitude_controller_at_setpoint() {
        let law = AttitudeLaw::new(&LawConfig::default()).unwrap();
        let q = UnitQuaternion::from_euler_angles(0.3, -0.2, 2.0);

        let omega = law.compute(&q, &q).unwrap();

        assert_relative_eq!(omega.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_error_commands_yaw_rate() {
        let law = AttitudeLaw::new(&LawConfig::default()).unwrap();
        let q = UnitQuaternion::identity();
        let q_r = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.1);

        let omega = law.compute(&q, &q_r).unwrap();

        assert_relative_eq!(omega, Vector3::new(0.0, 0.0, 0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_error_is_in_body_frame() {
        let config = LawConfig::default();
        let law = AttitudeLaw::new(&config).unwrap();
        // Yawed 90°, asked to roll about body x
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let q_r = q * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.2);

        let omega = law.compute(&q, &q_r).unwrap();

        assert_relative_eq!(
            omega,
            Vector3::new(0.2 * config.attitude.kp_rollpitch, 0.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sign_ambiguity_takes_short_path() {
        let law = AttitudeLaw::new(&LawConfig::default()).unwrap();
        let q_r = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.4);

        let f = law.function();
        let p = quaternion_to_param(&q_r);
        let flipped = [-p[0], -p[1], -p[2], -p[3]];
        let direct = f.call(&[&[1.0, 0.0, 0.0, 0.0], &p]).unwrap();
        let negated = f.call(&[&[1.0, 0.0, 0.0, 0.0], &flipped]).unwrap();

        assert_relative_eq!(direct[0][1], 0.8, epsilon = 1e-12);
        assert_relative_eq!(negated[0][1], 0.8, epsilon = 1e-12);
    }
}
