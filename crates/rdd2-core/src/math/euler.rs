//! Body 3-2-1 Euler angles
//!
//! Parameters are ordered `[yaw, pitch, roll]`: rotate about body z by yaw,
//! then about the new y by pitch, then about the new x by roll. The
//! representation is singular at pitch = ±90°.

use super::quaternion::Quat;
use crate::sym::{Elements, Expr, SMat3, SVec, SVec3};

/// Symbolic body 3-2-1 Euler triple
#[derive(Debug, Clone)]
pub struct Euler321 {
    param: SVec3,
}

impl Euler321 {
    pub fn new(yaw: Expr, pitch: Expr, roll: Expr) -> Self {
        Self {
            param: SVec::new([yaw, pitch, roll]),
        }
    }

    pub fn from_param(param: SVec3) -> Self {
        Self { param }
    }

    pub fn param(&self) -> &SVec3 {
        &self.param
    }

    pub fn yaw(&self) -> &Expr {
        &self.param[0]
    }

    pub fn pitch(&self) -> &Expr {
        &self.param[1]
    }

    pub fn roll(&self) -> &Expr {
        &self.param[2]
    }

    /// Euler angles of a unit quaternion
    ///
    /// The pitch sine is clamped to [-1, 1] so rounding near gimbal lock
    /// cannot produce NaN.
    pub fn from_quat(q: &Quat) -> Self {
        let (w, x, y, z) = (q.w(), q.x(), q.y(), q.z());
        let roll = (2.0 * (w * x + y * z)).atan2(&(1.0 - 2.0 * (x * x + y * y)));
        let sin_pitch = (2.0 * (w * y - z * x))
            .min(&Expr::one())
            .max(&Expr::constant(-1.0));
        let pitch = sin_pitch.asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(&(1.0 - 2.0 * (y * y + z * z)));
        Self::new(yaw, pitch, roll)
    }

    pub fn to_quat(&self) -> Quat {
        let (cy, sy) = half_angle(self.yaw());
        let (cp, sp) = half_angle(self.pitch());
        let (cr, sr) = half_angle(self.roll());
        Quat::from_param(SVec::new([
            &cr * &cp * &cy + &sr * &sp * &sy,
            &sr * &cp * &cy - &cr * &sp * &sy,
            &cr * &sp * &cy + &sr * &cp * &sy,
            &cr * &cp * &sy - &sr * &sp * &cy,
        ]))
    }

    /// Rotation matrix `Rz(yaw)·Ry(pitch)·Rx(roll)`, body to world
    pub fn to_matrix(&self) -> SMat3 {
        let (cy, sy) = (self.yaw().cos(), self.yaw().sin());
        let (cp, sp) = (self.pitch().cos(), self.pitch().sin());
        let (cr, sr) = (self.roll().cos(), self.roll().sin());
        SMat3::from_rows([
            [
                &cy * &cp,
                &cy * &sp * &sr - &sy * &cr,
                &cy * &sp * &cr + &sy * &sr,
            ],
            [
                &sy * &cp,
                &sy * &sp * &sr + &cy * &cr,
                &sy * &sp * &cr - &cy * &sr,
            ],
            [-&sp, &cp * &sr, &cp * &cr],
        ])
    }
}

fn half_angle(angle: &Expr) -> (Expr, Expr) {
    let half = angle * 0.5;
    (half.cos(), half.sin())
}

impl Elements for Euler321 {
    fn elements(&self) -> Vec<Expr> {
        self.param.elements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::quaternion::{quaternion_from_param, quaternion_to_param};
    use crate::sym::{Function, Signal};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, UnitQuaternion};

    fn euler_fn<T: Elements>(f: impl Fn(&Euler321) -> T) -> Function {
        let e = Euler321::from_param(SVec::symbol("e"));
        let out = f(&e);
        Function::new("f", vec![Signal::new("e", &e)], vec![Signal::new("y", &out)]).unwrap()
    }

    #[test]
    fn test_to_quat_matches_nalgebra() {
        let f = euler_fn(|e| e.to_quat());
        let (yaw, pitch, roll) = (1.1, -0.3, 0.25);
        let out = f.call(&[&[yaw, pitch, roll]]).unwrap().remove(0);

        let expected = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        let q = quaternion_from_param(&out).unwrap();
        assert_relative_eq!(q.angle_to(&expected), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_quat_matches_nalgebra() {
        let q = Quat::symbol("q");
        let f = Function::new(
            "f",
            vec![Signal::new("q", &q)],
            vec![Signal::new("e", &q.to_euler321())],
        )
        .unwrap();

        let expected = UnitQuaternion::from_euler_angles(-0.4, 0.7, 2.9);
        let out = f.call(&[&quaternion_to_param(&expected)]).unwrap().remove(0);
        let (roll, pitch, yaw) = expected.euler_angles();
        assert_relative_eq!(out[0], yaw, epsilon = 1e-12);
        assert_relative_eq!(out[1], pitch, epsilon = 1e-12);
        assert_relative_eq!(out[2], roll, epsilon = 1e-12);
    }

    #[test]
    fn test_to_matrix_matches_quaternion_matrix() {
        let f = euler_fn(|e| e.to_matrix());
        let g = euler_fn(|e| e.to_quat().to_matrix());
        let angles = [0.8, 0.4, -1.3];

        let direct = Matrix3::from_column_slice(&f.call(&[&angles]).unwrap()[0]);
        let via_quat = Matrix3::from_column_slice(&g.call(&[&angles]).unwrap()[0]);
        assert_relative_eq!(direct, via_quat, epsilon = 1e-12);
    }

    #[test]
    fn test_pitch_is_clamped_at_gimbal_lock() {
        let q = Quat::symbol("q");
        let f = Function::new(
            "f",
            vec![Signal::new("q", &q)],
            vec![Signal::new("e", &q.to_euler321())],
        )
        .unwrap();

        // Slightly non-unit quaternion at pitch = 90°: 2(wy - zx) > 1
        let s = std::f64::consts::FRAC_1_SQRT_2 + 1e-9;
        let out = f.call(&[&[s, 0.0, s, 0.0]]).unwrap().remove(0);
        assert!(out.iter().all(|v| v.is_finite()));
        assert_relative_eq!(out[1], std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }
}
