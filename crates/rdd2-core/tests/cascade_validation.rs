//! Cascade Validation Tests
//!
//! Checks the derived control laws against their defining properties:
//! 1. Orientation conversions are mutually inverse
//! 2. Saturation and integrator anti-windup hold their bounds
//! 3. Each law is quiet at its operating point
//! 4. Degenerate geometry never produces NaN
//! 5. The laws compose into a stable cascade

use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

use rdd2_core::control::{
    attitude, attitude_rate, conversion, manual, position, saturate, AttitudeLaw,
    AttitudeRateLaw, PositionLaw, TrajectoryReference, VehicleState,
};
use rdd2_core::math::{quaternion_from_param, quaternion_to_param, Quat, DEG2RAD};
use rdd2_core::sym::{Function, SVec, SVec3, Signal};
use rdd2_core::LawConfig;

/// Orientation representation round trips
mod orientation_tests {
    use super::*;

    #[test]
    fn test_euler_round_trip_grid() {
        let to_quat = conversion::derive_euler_to_quat().unwrap();
        let to_euler = conversion::derive_quat_to_euler().unwrap();

        for yaw in [-3.0, -1.0, 0.0, 1.5, 3.1] {
            for pitch in [-1.5, -0.5, 0.0, 0.7, 1.5] {
                for roll in [-3.1, -0.2, 0.0, 2.0] {
                    let q = to_quat.call(&[&[yaw], &[pitch], &[roll]]).unwrap().remove(0);
                    let out = to_euler.call(&[&q]).unwrap();

                    assert_relative_eq!(out[0][0], yaw, epsilon = 1e-8);
                    assert_relative_eq!(out[1][0], pitch, epsilon = 1e-8);
                    assert_relative_eq!(out[2][0], roll, epsilon = 1e-8);
                }
            }
        }
    }

    #[test]
    fn test_log_exp_round_trip() {
        let omega = SVec3::symbol("omega");
        let f = Function::new(
            "log_exp",
            vec![Signal::new("omega", &omega)],
            vec![Signal::new("y", &Quat::exp(&omega).log())],
        )
        .unwrap();

        for w in [[0.0, 0.0, 0.0], [1e-9, 0.0, -1e-9], [0.3, -0.2, 0.1], [0.0, 2.5, 0.0], [-1.0, 1.0, 1.0]] {
            let out = f.call(&[&w]).unwrap().remove(0);
            assert_relative_eq!(Vector3::from_column_slice(&out), Vector3::from(w), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_matrix_round_trip_every_branch() {
        let q = Quat::symbol("q");
        let f = Function::new(
            "matrix_round_trip",
            vec![Signal::new("q", &q)],
            vec![Signal::new("y", &Quat::from_matrix(&q.to_matrix()))],
        )
        .unwrap();

        // Dominant w, then rotations by π about x, y and z
        let cases = [
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI - 0.1),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI - 0.1),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI - 0.1),
        ];
        for expected in cases {
            let out = f.call(&[&quaternion_to_param(&expected)]).unwrap().remove(0);
            let q = quaternion_from_param(&out).unwrap();

            assert!(out[0] >= 0.0);
            assert_relative_eq!(q.angle_to(&expected), 0.0, epsilon = 1e-9);
        }
    }
}

/// Saturation and anti-windup bounds
mod saturation_tests {
    use super::*;

    #[test]
    fn test_saturation_stays_within_bounds() {
        let x = SVec::<3>::symbol("x");
        let f = Function::new(
            "sat",
            vec![Signal::new("x", &x)],
            vec![Signal::new(
                "y",
                &saturate(&x, &SVec::from_f64([-1.0, -0.5, 0.0]), &SVec::from_f64([1.0, 0.5, 2.0])),
            )],
        )
        .unwrap();

        for v in [-10.0, -1.0, -0.25, 0.0, 0.25, 1.0, 10.0] {
            let y = f.call(&[&[v, v, v]]).unwrap().remove(0);
            for (i, (lo, hi)) in [(-1.0, 1.0), (-0.5, 0.5), (0.0, 2.0)].into_iter().enumerate() {
                assert!(y[i] >= lo && y[i] <= hi);
                if v >= lo && v <= hi {
                    assert_eq!(y[i], v);
                }
            }
        }
    }

    #[test]
    fn test_integral_never_leaves_bounds() {
        let config = LawConfig::default();
        let law = AttitudeRateLaw::new(&config).unwrap();
        let bound = Vector3::new(
            config.rate.rollpitch_integral_max,
            config.rate.rollpitch_integral_max,
            config.rate.yaw_integral_max,
        );

        let mut integral = Vector3::zeros();
        for k in 0..500 {
            // Persistent error, reversing halfway through
            let sign = if k < 250 { 1.0 } else { -1.0 };
            let omega_ref = Vector3::new(5.0, -3.0, 8.0) * sign;
            let out = law.compute(&Vector3::zeros(), &omega_ref, &integral, 0.01).unwrap();
            integral = out.integral;

            for i in 0..3 {
                assert!(integral[i].abs() <= bound[i]);
            }
        }
        assert_relative_eq!(integral, Vector3::new(-1.0, 1.0, -1.0), epsilon = 1e-12);
    }
}

/// Each law at its operating point
mod operating_point_tests {
    use super::*;

    #[test]
    fn test_attitude_law_zero_at_reference() {
        let law = AttitudeLaw::new(&LawConfig::default()).unwrap();
        for q in [
            UnitQuaternion::identity(),
            UnitQuaternion::from_euler_angles(0.4, -0.3, 2.8),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI),
        ] {
            assert_relative_eq!(law.compute(&q, &q).unwrap().norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rate_law_zero_inputs() {
        let f = attitude_rate::derive(&LawConfig::default()).unwrap();
        let out = f.call(&[&[0.0; 3], &[0.0; 3], &[0.0; 3], &[0.0]]).unwrap();

        assert_eq!(out[0], vec![0.0; 3]);
        assert_eq!(out[1], vec![0.0; 3]);
    }

    #[test]
    fn test_acro_full_roll() {
        let f = manual::derive_acro(&LawConfig::default()).unwrap();
        let out = f.call(&[&[1.0], &[0.0], &[0.0], &[0.0]]).unwrap();

        assert_relative_eq!(out[0][0], -60.0 * DEG2RAD, epsilon = 1e-12);
        assert_relative_eq!(out[0][1], 0.0);
        assert_relative_eq!(out[0][2], 0.0);
        assert_relative_eq!(out[1][0], 0.5);
    }

    #[test]
    fn test_position_hover() {
        let config = LawConfig::default();
        let law = PositionLaw::new(&config).unwrap();

        for yaw in [-2.0, 0.0, 0.5, 3.0] {
            let camera = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw);
            let state = VehicleState {
                position: Vector3::new(4.0, 5.0, -1.0),
                velocity: Vector3::zeros(),
                orientation: UnitQuaternion::from_euler_angles(0.05, 0.0, 1.0),
            };
            let reference = TrajectoryReference::hold(state.position);

            let out = law.compute(&reference, &camera, &state).unwrap();

            assert_relative_eq!(out.thrust, config.thrust.trim, epsilon = 1e-12);
            let (roll, pitch, out_yaw) = out.orientation_ref.euler_angles();
            assert_relative_eq!(roll, 0.0, epsilon = 1e-9);
            assert_relative_eq!(pitch, 0.0, epsilon = 1e-9);
            assert_relative_eq!(out_yaw, yaw, epsilon = 1e-9);
        }
    }
}

/// Degenerate geometry
mod degeneracy_tests {
    use super::*;

    #[test]
    fn test_zero_thrust_falls_back_to_world_up() {
        let mut config = LawConfig::default();
        config.position.thrust_norm_max = 1.0;
        let law = PositionLaw::new(&config).unwrap();

        // Feed-forward acceleration cancels the trim exactly
        let reference = TrajectoryReference {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::new(0.0, 0.0, -2.0 * config.gravity * config.thrust.trim),
        };
        let state = VehicleState {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        };

        let out = law.compute(&reference, &UnitQuaternion::identity(), &state).unwrap();

        assert_relative_eq!(out.thrust, 0.0, epsilon = 1e-12);
        assert!(out.orientation_ref.coords.iter().all(|v| v.is_finite()));
        assert_relative_eq!(out.orientation_ref * Vector3::z(), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_horizontal_thrust_along_heading_gives_unit_setpoint() {
        let mut config = LawConfig::default();
        config.position.thrust_norm_max = 1.0;
        let two_g = 2.0 * config.gravity;
        let f = position::derive(&config).unwrap();

        // Feed-forward leaves T = (0.6, 0, 0), parallel to the camera heading
        let out = f
            .call(&[
                &[0.0; 3],
                &[0.0; 3],
                &[0.6 * two_g, 0.0, -config.thrust.trim * two_g],
                &[1.0, 0.0, 0.0, 0.0],
                &[0.0; 3],
                &[0.0; 3],
                &[1.0, 0.0, 0.0, 0.0],
            ])
            .unwrap();

        assert_relative_eq!(out[0][0], 0.6, epsilon = 1e-12);
        let norm = out[1].iter().map(|v| v * v).sum::<f64>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);

        let q = quaternion_from_param(&out[1]).unwrap();
        assert_relative_eq!(q * Vector3::z(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_attitude_law_at_half_turn_is_finite() {
        let f = attitude::derive(&LawConfig::default()).unwrap();
        let out = f.call(&[&[1.0, 0.0, 0.0, 0.0], &[0.0, 0.0, 0.0, 1.0]]).unwrap();

        assert!(out[0].iter().all(|v| v.is_finite()));
        assert_relative_eq!(out[0][2].abs(), 2.0 * PI, epsilon = 1e-12);
    }
}

/// The laws chained as in flight
mod cascade_tests {
    use super::*;

    /// Integrate body rates over one step
    fn integrate(q: &UnitQuaternion<f64>, omega: &Vector3<f64>, dt: f64) -> UnitQuaternion<f64> {
        q * UnitQuaternion::from_scaled_axis(omega * dt)
    }

    #[test]
    fn test_attitude_loop_converges() {
        let law = AttitudeLaw::new(&LawConfig::default()).unwrap();
        let q_r = UnitQuaternion::from_euler_angles(0.2, -0.1, 1.0);
        let mut q = UnitQuaternion::identity();

        // Ideal rate tracking
        for _ in 0..500 {
            let omega = law.compute(&q, &q_r).unwrap();
            q = integrate(&q, &omega, 0.01);
        }

        assert_relative_eq!(q.angle_to(&q_r), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_position_to_moment_chain() {
        let config = LawConfig::default();
        let position = PositionLaw::new(&config).unwrap();
        let attitude = AttitudeLaw::new(&config).unwrap();
        let rate = AttitudeRateLaw::new(&config).unwrap();

        // Reference ahead along world x: expect nose-down pitch, positive moment about y
        let state = VehicleState {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        };
        let reference = TrajectoryReference::hold(Vector3::new(1.0, 0.0, 0.0));

        let setpoint = position
            .compute(&reference, &UnitQuaternion::identity(), &state)
            .unwrap();
        let omega_ref = attitude
            .compute(&state.orientation, &setpoint.orientation_ref)
            .unwrap();
        let out = rate
            .compute(&Vector3::zeros(), &omega_ref, &Vector3::zeros(), 0.01)
            .unwrap();

        assert!(setpoint.thrust > config.thrust.trim);
        assert!(omega_ref.y > 0.0);
        assert_relative_eq!(omega_ref.x, 0.0, epsilon = 1e-12);
        assert!(out.moment.y > 0.0);
        assert!(out.moment.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_auto_level_feeds_attitude_law() {
        let config = LawConfig::default();
        let mapper = manual::derive_auto_level(&config).unwrap();
        let attitude = AttitudeLaw::new(&config).unwrap();
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.7);

        // Full forward pitch stick
        let out = mapper
            .call(&[&[0.0], &[1.0], &[0.0], &[0.0], &quaternion_to_param(&q)])
            .unwrap();
        let q_r = quaternion_from_param(&out[0]).unwrap();
        let omega = attitude.compute(&q, &q_r).unwrap();

        assert_relative_eq!(
            omega,
            Vector3::new(0.0, config.attitude.kp_rollpitch * 20.0 * DEG2RAD, 0.0),
            epsilon = 1e-9
        );
    }
}
