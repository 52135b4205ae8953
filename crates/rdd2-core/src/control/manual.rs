//! Manual stick mappers
//!
//! Each mapper turns the four stick axes (nominally in [-1, 1]) into a
//! setpoint for one level of the cascade:
//! - acro: body rate setpoint, feeds the attitude rate loop
//! - auto-level: attitude setpoint, feeds the attitude loop
//! - position: world velocity and attitude setpoints
//!
//! All three share the throttle law `thrust = joy_thrust * delta + trim`.

use crate::config::LawConfig;
use crate::error::GraphError;
use crate::math::{Euler321, Quat, DEG2RAD};
use crate::sym::{Expr, Function, SVec, SVec3, Signal};

pub const ACRO_NAME: &str = "joy_acro";
pub const AUTO_LEVEL_NAME: &str = "joy_auto_level";
pub const POSITION_NAME: &str = "joy_position";

/// Symbolic stick axes
struct Sticks {
    roll: Expr,
    pitch: Expr,
    yaw: Expr,
    thrust: Expr,
}

impl Sticks {
    fn symbol() -> Self {
        Self {
            roll: Expr::symbol("joy_roll"),
            pitch: Expr::symbol("joy_pitch"),
            yaw: Expr::symbol("joy_yaw"),
            thrust: Expr::symbol("joy_thrust"),
        }
    }

    fn signals(&self) -> Vec<Signal> {
        vec![
            Signal::new("joy_roll", &self.roll),
            Signal::new("joy_pitch", &self.pitch),
            Signal::new("joy_yaw", &self.yaw),
            Signal::new("joy_thrust", &self.thrust),
        ]
    }

    fn throttle(&self, config: &LawConfig) -> Expr {
        &self.thrust * config.thrust.delta + config.thrust.trim
    }

    /// Attitude setpoint: hold current yaw plus a stick offset, absolute roll
    /// and pitch
    fn level_attitude(&self, q: &Quat, config: &LawConfig) -> Quat {
        let limits = &config.manual;
        let yaw = q.to_euler321().yaw().clone();
        Euler321::new(
            yaw + &self.yaw * (limits.yaw_rate_max * DEG2RAD),
            &self.pitch * (limits.rollpitch_max * DEG2RAD),
            -(&self.roll * (limits.rollpitch_max * DEG2RAD)),
        )
        .to_quat()
    }
}

/// `joy_acro(joy_roll, joy_pitch, joy_yaw, joy_thrust) -> (omega, thrust)`
///
/// Stick deflection maps linearly to body rates in rad/s. Right roll stick
/// commands a negative roll rate.
pub fn derive_acro(config: &LawConfig) -> Result<Function, GraphError> {
    let sticks = Sticks::symbol();
    let limits = &config.manual;

    let omega = SVec3::new([
        -(&sticks.roll * (limits.rollpitch_rate_max * DEG2RAD)),
        &sticks.pitch * (limits.rollpitch_rate_max * DEG2RAD),
        &sticks.yaw * (limits.yaw_rate_max * DEG2RAD),
    ]);

    Function::new(
        ACRO_NAME,
        sticks.signals(),
        vec![
            Signal::new("omega", &omega),
            Signal::new("thrust", &sticks.throttle(config)),
        ],
    )
}

/// `joy_auto_level(joy_roll, joy_pitch, joy_yaw, joy_thrust, q) -> (q_r, thrust)`
pub fn derive_auto_level(config: &LawConfig) -> Result<Function, GraphError> {
    let sticks = Sticks::symbol();
    let q = Quat::symbol("q");

    let q_r = sticks.level_attitude(&q, config);

    let mut inputs = sticks.signals();
    inputs.push(Signal::new("q", &q));
    Function::new(
        AUTO_LEVEL_NAME,
        inputs,
        vec![
            Signal::new("q_r", &q_r),
            Signal::new("thrust", &sticks.throttle(config)),
        ],
    )
}

/// `joy_position(joy_roll, joy_pitch, joy_yaw, joy_thrust, q) -> (v_w, q_r, thrust)`
///
/// The body-frame velocity command `(vel_max * joy_pitch, vel_max * joy_roll)`
/// is rotated into the world frame by the current yaw. The vertical component
/// is the raw throttle stick.
pub fn derive_position(config: &LawConfig) -> Result<Function, GraphError> {
    let sticks = Sticks::symbol();
    let q = Quat::symbol("q");

    let yaw = q.to_euler321().yaw().clone();
    let (cos_yaw, sin_yaw) = (yaw.cos(), yaw.sin());
    let vb_x = &sticks.pitch * config.manual.vel_max;
    let vb_y = &sticks.roll * config.manual.vel_max;
    let v_w = SVec::new([
        &vb_x * &cos_yaw - &vb_y * &sin_yaw,
        &vb_x * &sin_yaw + &vb_y * &cos_yaw,
        sticks.thrust.clone(),
    ]);

    let q_r = sticks.level_attitude(&q, config);

    let mut inputs = sticks.signals();
    inputs.push(Signal::new("q", &q));
    Function::new(
        POSITION_NAME,
        inputs,
        vec![
            Signal::new("v_w", &v_w),
            Signal::new("q_r", &q_r),
            Signal::new("thrust", &sticks.throttle(config)),
        ],
    )
}
