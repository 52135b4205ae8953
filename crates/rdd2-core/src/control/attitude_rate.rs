//! Attitude rate controller
//!
//! PI control on the body rate error with a saturated integrator. The
//! integral state is owned by the caller and threaded through each call.

use nalgebra::Vector3;

use super::saturation::saturate;
use crate::config::LawConfig;
use crate::error::GraphError;
use crate::sym::{Expr, Function, SVec, SVec3, Signal};

pub const NAME: &str = "attitude_rate_control";

/// Longest time step the host loop will integrate over [s]
pub const MAX_STEP: f64 = 0.1;

/// `attitude_rate_control(omega, omega_r, omega_i, dt) -> (M, omega_i_update)`
///
/// ```text
/// e   = ω_r - ω
/// ω_i' = sat(ω_i + e·dt, -bound, bound)
/// M   = Kp ⊙ e + Ki ⊙ ω_i'
/// ```
///
/// The integral is saturated before it contributes to the moment.
pub fn derive(config: &LawConfig) -> Result<Function, GraphError> {
    let omega = SVec3::symbol("omega");
    let omega_r = SVec3::symbol("omega_r");
    let omega_i = SVec3::symbol("omega_i");
    let dt = Expr::symbol("dt");

    let gains = &config.rate;
    let kp = SVec::from_f64([gains.kp_rollpitch, gains.kp_rollpitch, gains.kp_yaw]);
    let ki = SVec::from_f64([gains.ki_rollpitch, gains.ki_rollpitch, gains.ki_yaw]);
    let bound = SVec::from_f64([
        gains.rollpitch_integral_max,
        gains.rollpitch_integral_max,
        gains.yaw_integral_max,
    ]);

    let e = &omega_r - &omega;
    let omega_i_update = saturate(&(&omega_i + &(&e * &dt)), &-&bound, &bound);
    let moment = kp.component_mul(&e) + ki.component_mul(&omega_i_update);

    Function::new(
        NAME,
        vec![
            Signal::new("omega", &omega),
            Signal::new("omega_r", &omega_r),
            Signal::new("omega_i", &omega_i),
            Signal::new("dt", &dt),
        ],
        vec![
            Signal::new("M", &moment),
            Signal::new("omega_i_update", &omega_i_update),
        ],
    )
}

/// Output of one rate controller evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateOutput {
    /// Normalised body moment command
    pub moment: Vector3<f64>,
    /// Saturated integral to pass into the next call
    pub integral: Vector3<f64>,
}

/// Host-side evaluator for [`derive`]
#[derive(Debug, Clone)]
pub struct AttitudeRateLaw {
    function: Function,
}

impl AttitudeRateLaw {
    pub fn new(config: &LawConfig) -> Result<Self, GraphError> {
        Ok(Self {
            function: derive(config)?,
        })
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// # Arguments
    /// * `omega` - Measured body rate [rad/s]
    /// * `omega_ref` - Body rate setpoint [rad/s]
    /// * `integral` - Integral state from the previous call
    /// * `dt` - Time since the previous call [s]
    pub fn compute(
        &self,
        omega: &Vector3<f64>,
        omega_ref: &Vector3<f64>,
        integral: &Vector3<f64>,
        dt: f64,
    ) -> Result<RateOutput, GraphError> {
        let out = self.function.call(&[
            omega.as_slice(),
            omega_ref.as_slice(),
            integral.as_slice(),
            &[dt],
        ])?;
        Ok(RateOutput {
            moment: Vector3::from_column_slice(&out[0]),
            integral: Vector3::from_column_slice(&out[1]),
        })
    }
}

/// Rate loop that carries the integral between ticks
///
/// Ticks with a negative or overly long time step are skipped and leave the
/// integral untouched.
#[derive(Debug, Clone)]
pub struct RateLoop {
    law: AttitudeRateLaw,
    integral: Vector3<f64>,
}

impl RateLoop {
    pub fn new(law: AttitudeRateLaw) -> Self {
        Self {
            law,
            integral: Vector3::zeros(),
        }
    }

    pub fn integral(&self) -> &Vector3<f64> {
        &self.integral
    }

    /// Run one tick, returning the moment command or `None` if skipped
    pub fn step(
        &mut self,
        omega: &Vector3<f64>,
        omega_ref: &Vector3<f64>,
        dt: f64,
    ) -> Result<Option<Vector3<f64>>, GraphError> {
        if !(0.0..=MAX_STEP).contains(&dt) {
            log::debug!("skipping rate loop tick with dt = {dt} s");
            return Ok(None);
        }

        let out = self.law.compute(omega, omega_ref, &self.integral, dt)?;
        self.integral = out.integral;
        Ok(Some(out.moment))
    }

    pub fn reset(&mut self) {
        self.integral = Vector3::zeros();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rate_loop() -> RateLoop {
        RateLoop::new(AttitudeRateLaw::new(&LawConfig::default()).unwrap())
    }

    #[test]
    fn test_zero_inputs_give_zero_outputs() {
        let law = AttitudeRateLaw::new(&LawConfig::default()).unwrap();
        let zero = Vector3::zeros();

        let out = law.compute(&zero, &zero, &zero, 0.0).unwrap();

        assert_relative_eq!(out.moment.norm(), 0.0);
        assert_relative_eq!(out.integral.norm(), 0.0);
    }

    #[test]
    fn test_proportional_and_integral_terms() {
        let config = LawConfig::default();
        let law = AttitudeRateLaw::new(&config).unwrap();

        let out = law
            .compute(
                &Vector3::zeros(),
                &Vector3::new(1.0, -2.0, 0.5),
                &Vector3::new(0.1, 0.0, 0.0),
                0.01,
            )
            .unwrap();

        let gains = &config.rate;
        let integral = Vector3::new(0.11, -0.02, 0.005);
        assert_relative_eq!(out.integral, integral, epsilon = 1e-12);
        assert_relative_eq!(
            out.moment,
            Vector3::new(
                gains.kp_rollpitch * 1.0 + gains.ki_rollpitch * integral.x,
                gains.kp_rollpitch * -2.0 + gains.ki_rollpitch * integral.y,
                gains.kp_yaw * 0.5 + gains.ki_yaw * integral.z,
            ),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integral_is_saturated_before_moment() {
        let config = LawConfig::default();
        let law = AttitudeRateLaw::new(&config).unwrap();

        let out = law
            .compute(
                &Vector3::zeros(),
                &Vector3::new(100.0, -100.0, 0.0),
                &Vector3::zeros(),
                0.1,
            )
            .unwrap();

        assert_relative_eq!(out.integral, Vector3::new(1.0, -1.0, 0.0));
        assert_relative_eq!(
            out.moment.x,
            config.rate.kp_rollpitch * 100.0 + config.rate.ki_rollpitch * 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rate_loop_accumulates_and_resets() {
        let mut rate_loop = rate_loop();
        let omega_ref = Vector3::new(0.0, 0.0, 1.0);

        for _ in 0..10 {
            rate_loop.step(&Vector3::zeros(), &omega_ref, 0.01).unwrap();
        }
        assert_relative_eq!(rate_loop.integral().z, 0.1, epsilon = 1e-12);

        rate_loop.reset();
        assert_relative_eq!(rate_loop.integral().norm(), 0.0);
    }

    #[test]
    fn test_rate_loop_skips_bad_time_steps() {
        let mut rate_loop = rate_loop();
        let omega_ref = Vector3::new(1.0, 1.0, 1.0);

        assert!(rate_loop.step(&Vector3::zeros(), &omega_ref, -0.01).unwrap().is_none());
        assert!(rate_loop.step(&Vector3::zeros(), &omega_ref, 0.5).unwrap().is_none());
        assert_relative_eq!(rate_loop.integral().norm(), 0.0);

        assert!(rate_loop.step(&Vector3::zeros(), &omega_ref, MAX_STEP).unwrap().is_some());
    }
}
