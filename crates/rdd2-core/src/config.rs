//! Control law configuration
//!
//! Gains and limits are fixed at derivation time and baked into the generated
//! functions as constants. They are not runtime inputs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete set of control law parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LawConfig {
    /// Gravitational acceleration [m/s²]
    pub gravity: f64,
    /// Throttle trim and stick authority
    pub thrust: ThrustConfig,
    /// Position loop
    pub position: PositionGains,
    /// Attitude loop
    pub attitude: AttitudeGains,
    /// Attitude rate loop
    pub rate: RateGains,
    /// Manual stick mapping limits
    pub manual: ManualLimits,
}

impl Default for LawConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            thrust: ThrustConfig::default(),
            position: PositionGains::default(),
            attitude: AttitudeGains::default(),
            rate: RateGains::default(),
            manual: ManualLimits::default(),
        }
    }
}

/// Normalised throttle around hover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrustConfig {
    /// Hover throttle
    pub trim: f64,
    /// Throttle change at full stick deflection
    pub delta: f64,
}

impl Default for ThrustConfig {
    fn default() -> Self {
        Self {
            trim: 0.5,
            delta: 0.1,
        }
    }
}

/// Position controller gains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionGains {
    /// Position proportional gain
    pub kp: f64,
    /// Velocity proportional gain
    pub kv: f64,
    /// Cap on the magnitude of the normalised thrust correction
    pub thrust_norm_max: f64,
    /// Norm below which the thrust and heading axes fall back to world axes
    pub epsilon: f64,
}

impl Default for PositionGains {
    fn default() -> Self {
        Self {
            kp: 0.2,
            kv: 1.0,
            thrust_norm_max: 0.3,
            epsilon: 1e-3,
        }
    }
}

/// Attitude controller gains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttitudeGains {
    /// Proportional gain, roll and pitch
    pub kp_rollpitch: f64,
    /// Proportional gain, yaw
    pub kp_yaw: f64,
}

impl Default for AttitudeGains {
    fn default() -> Self {
        Self {
            kp_rollpitch: 2.0,
            kp_yaw: 2.0,
        }
    }
}

/// Attitude rate controller gains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateGains {
    pub kp_rollpitch: f64,
    pub ki_rollpitch: f64,
    pub kp_yaw: f64,
    pub ki_yaw: f64,
    /// Anti-windup bound on the roll and pitch rate error integral
    pub rollpitch_integral_max: f64,
    /// Anti-windup bound on the yaw rate error integral
    pub yaw_integral_max: f64,
}

impl Default for RateGains {
    fn default() -> Self {
        Self {
            kp_rollpitch: 0.015,
            ki_rollpitch: 0.05,
            kp_yaw: 0.1,
            ki_yaw: 0.02,
            rollpitch_integral_max: 1.0,
            yaw_integral_max: 1.0,
        }
    }
}

/// Manual stick mapping limits, reached at full deflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualLimits {
    /// Roll and pitch rate in acro mode [deg/s]
    pub rollpitch_rate_max: f64,
    /// Yaw rate command, also the auto-level yaw offset [deg/s]
    pub yaw_rate_max: f64,
    /// Roll and pitch angle in auto-level and position modes [deg]
    pub rollpitch_max: f64,
    /// Horizontal velocity in position mode [m/s]
    pub vel_max: f64,
}

impl Default for ManualLimits {
    fn default() -> Self {
        Self {
            rollpitch_rate_max: 60.0,
            yaw_rate_max: 60.0,
            rollpitch_max: 20.0,
            vel_max: 2.0,
        }
    }
}

impl LawConfig {
    /// Parse a JSON document; omitted fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every parameter is finite and that divisors and bounds are
    /// positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("gravity", self.gravity),
            ("thrust.trim", self.thrust.trim),
            ("thrust.delta", self.thrust.delta),
            ("position.kp", self.position.kp),
            ("position.kv", self.position.kv),
            ("position.thrust_norm_max", self.position.thrust_norm_max),
            ("position.epsilon", self.position.epsilon),
            ("attitude.kp_rollpitch", self.attitude.kp_rollpitch),
            ("attitude.kp_yaw", self.attitude.kp_yaw),
            ("rate.kp_rollpitch", self.rate.kp_rollpitch),
            ("rate.ki_rollpitch", self.rate.ki_rollpitch),
            ("rate.kp_yaw", self.rate.kp_yaw),
            ("rate.ki_yaw", self.rate.ki_yaw),
            ("rate.rollpitch_integral_max", self.rate.rollpitch_integral_max),
            ("rate.yaw_integral_max", self.rate.yaw_integral_max),
            ("manual.rollpitch_rate_max", self.manual.rollpitch_rate_max),
            ("manual.yaw_rate_max", self.manual.yaw_rate_max),
            ("manual.rollpitch_max", self.manual.rollpitch_max),
            ("manual.vel_max", self.manual.vel_max),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }

        let positive = [
            ("gravity", self.gravity),
            ("position.thrust_norm_max", self.position.thrust_norm_max),
            ("position.epsilon", self.position.epsilon),
            ("rate.rollpitch_integral_max", self.rate.rollpitch_integral_max),
            ("rate.yaw_integral_max", self.rate.yaw_integral_max),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive(name));
            }
        }

        Ok(())
    }
}
