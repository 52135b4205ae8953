//! Control laws for the rdd2 cascade
//!
//! Position -> attitude -> attitude rate -> moment, plus the manual stick
//! mappers that enter the cascade at each level:
//! - Manual stick mappers (acro, auto-level, position)
//! - Attitude controller
//! - Attitude rate controller with integrator anti-windup
//! - Position controller
//! - Orientation conversions

pub mod attitude;
pub mod attitude_rate;
pub mod conversion;
pub mod manual;
pub mod position;
pub mod saturation;

pub use attitude::AttitudeLaw;
pub use attitude_rate::{AttitudeRateLaw, RateLoop, RateOutput};
pub use position::{PositionLaw, PositionOutput, TrajectoryReference, VehicleState};
pub use saturation::saturate;

use crate::config::LawConfig;
use crate::error::GraphError;
use crate::sym::Function;

/// Derive every law of the cascade in a fixed order
pub fn derive_all(config: &LawConfig) -> Result<Vec<Function>, GraphError> {
    Ok(vec![
        manual::derive_acro(config)?,
        manual::derive_auto_level(config)?,
        manual::derive_position(config)?,
        conversion::derive_quat_to_euler()?,
        conversion::derive_euler_to_quat()?,
        attitude::derive(config)?,
        attitude_rate::derive(config)?,
        position::derive(config)?,
    ])
}
