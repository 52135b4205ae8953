//! Quaternion operations for attitude representation
//!
//! Symbolic unit quaternion `q = [w, x, y, z]` (Hamilton convention, scalar
//! first) representing the rotation from body to world frame:
//! - Group composition and inversion
//! - Logarithm / exponential maps between SO(3) and body angular displacement
//! - Rotation matrix conversion (Shepperd's method for the inverse)

use nalgebra::{Quaternion, UnitQuaternion};

use super::euler::Euler321;
use crate::sym::{Elements, Expr, SMat3, SVec, SVec3};

/// Below this vector-part norm the logarithm uses its small-angle limit
pub const LOG_EPSILON: f64 = 1e-7;

/// Below this rotation angle the exponential uses its small-angle limit
pub const EXP_EPSILON: f64 = 1e-7;

/// Symbolic unit quaternion
#[derive(Debug, Clone)]
pub struct Quat {
    param: SVec<4>,
}

impl Quat {
    /// Wrap a parameter vector `[w, x, y, z]`
    ///
    /// The caller is responsible for the parameter having unit norm.
    pub fn from_param(param: SVec<4>) -> Self {
        Self { param }
    }

    /// A fresh symbolic quaternion named `name`
    pub fn symbol(name: &str) -> Self {
        Self::from_param(SVec::symbol(name))
    }

    pub fn identity() -> Self {
        Self::from_param(SVec::from_f64([1.0, 0.0, 0.0, 0.0]))
    }

    pub fn param(&self) -> &SVec<4> {
        &self.param
    }

    pub fn w(&self) -> &Expr {
        &self.param[0]
    }

    pub fn x(&self) -> &Expr {
        &self.param[1]
    }

    pub fn y(&self) -> &Expr {
        &self.param[2]
    }

    pub fn z(&self) -> &Expr {
        &self.param[3]
    }

    /// Vector part `[x, y, z]`
    pub fn vector(&self) -> SVec3 {
        SVec::new([self.x().clone(), self.y().clone(), self.z().clone()])
    }

    /// Group composition `self ⊗ rhs`
    ///
    /// With both quaternions mapping body to world, `q_wa ⊗ q_ab = q_wb`.
    pub fn compose(&self, rhs: &Quat) -> Quat {
        let (aw, ax, ay, az) = (self.w(), self.x(), self.y(), self.z());
        let (bw, bx, by, bz) = (rhs.w(), rhs.x(), rhs.y(), rhs.z());
        Quat::from_param(SVec::new([
            aw * bw - ax * bx - ay * by - az * bz,
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
        ]))
    }

    /// Group inverse (conjugate of a unit quaternion)
    pub fn inverse(&self) -> Quat {
        Quat::from_param(SVec::new([
            self.w().clone(),
            -self.x(),
            -self.y(),
            -self.z(),
        ]))
    }

    /// Logarithm map
    ///
    /// Returns the angular displacement `θ·axis` that, applied as a constant
    /// body rate for unit time, reproduces this rotation. The quaternion is
    /// first moved to the `w ≥ 0` hemisphere so the shortest rotation is
    /// returned.
    pub fn log(&self) -> SVec3 {
        let sign = Expr::select(
            &self.w().lt(&Expr::zero()),
            &Expr::constant(-1.0),
            &Expr::one(),
        );
        let w = self.w() * &sign;
        let v = &self.vector() * &sign;
        let n = v.norm();

        // θ/|v|, with the limit 2/w as |v| -> 0
        let scale = Expr::select(
            &n.gt(&Expr::constant(LOG_EPSILON)),
            &(2.0 * n.atan2(&w) / &n),
            &(2.0 / &w),
        );
        &v * &scale
    }

    /// Exponential map, inverse of [`Quat::log`]
    pub fn exp(omega: &SVec3) -> Quat {
        let theta = omega.norm();
        let half = &theta * 0.5;

        // sin(θ/2)/θ, with its Taylor expansion near zero
        let scale = Expr::select(
            &theta.gt(&Expr::constant(EXP_EPSILON)),
            &(half.sin() / &theta),
            &(0.5 - theta.squared() / 48.0),
        );
        let v = omega * &scale;
        Quat::from_param(SVec::new([
            half.cos(),
            v.x().clone(),
            v.y().clone(),
            v.z().clone(),
        ]))
    }

    /// Rotation matrix R(q) taking body-frame vectors to world frame
    pub fn to_matrix(&self) -> SMat3 {
        let (w, x, y, z) = (self.w(), self.x(), self.y(), self.z());
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        SMat3::from_rows([
            [
                1.0 - 2.0 * (&yy + &zz),
                2.0 * (&xy - &wz),
                2.0 * (&xz + &wy),
            ],
            [
                2.0 * (&xy + &wz),
                1.0 - 2.0 * (&xx + &zz),
                2.0 * (&yz - &wx),
            ],
            [
                2.0 * (&xz - &wy),
                2.0 * (&yz + &wx),
                1.0 - 2.0 * (&xx + &yy),
            ],
        ])
    }

    /// Rotate a body-frame vector into world frame
    pub fn rotate(&self, v: &SVec3) -> SVec3 {
        self.to_matrix().mul_vec(v)
    }

    /// Quaternion from a rotation matrix
    ///
    /// Shepperd's method: the branch dividing by the largest of
    /// `1 + trace`, `1 + 2·R_ii - trace` is chosen with `select`, so the
    /// branches that would take the square root of a negative number are
    /// never propagated. The result lies in the `w ≥ 0` hemisphere.
    pub fn from_matrix(r: &SMat3) -> Quat {
        let (r00, r01, r02) = (r.get(0, 0), r.get(0, 1), r.get(0, 2));
        let (r10, r11, r12) = (r.get(1, 0), r.get(1, 1), r.get(1, 2));
        let (r20, r21, r22) = (r.get(2, 0), r.get(2, 1), r.get(2, 2));
        let trace = r.trace();

        let s = (&trace + 1.0).sqrt() * 2.0;
        let from_trace = SVec::new([
            &s * 0.25,
            (r21 - r12) / &s,
            (r02 - r20) / &s,
            (r10 - r01) / &s,
        ]);

        let s = (r00 - r11 - r22 + 1.0).sqrt() * 2.0;
        let from_x = SVec::new([
            (r21 - r12) / &s,
            &s * 0.25,
            (r01 + r10) / &s,
            (r02 + r20) / &s,
        ]);

        let s = (r11 - r00 - r22 + 1.0).sqrt() * 2.0;
        let from_y = SVec::new([
            (r02 - r20) / &s,
            (r01 + r10) / &s,
            &s * 0.25,
            (r12 + r21) / &s,
        ]);

        let s = (r22 - r00 - r11 + 1.0).sqrt() * 2.0;
        let from_z = SVec::new([
            (r10 - r01) / &s,
            (r02 + r20) / &s,
            (r12 + r21) / &s,
            &s * 0.25,
        ]);

        let x_largest = r00.gt(r11).and(&r00.gt(r22));
        let y_largest = r11.gt(r22);
        let diagonal = SVec::select(
            &x_largest,
            &from_x,
            &SVec::select(&y_largest, &from_y, &from_z),
        );
        let q = SVec::select(&trace.gt(&Expr::zero()), &from_trace, &diagonal);

        let flip = q[0].lt(&Expr::zero());
        Quat::from_param(SVec::select(&flip, &(-&q), &q))
    }

    /// Body 3-2-1 Euler angles of this rotation
    pub fn to_euler321(&self) -> Euler321 {
        Euler321::from_quat(self)
    }

    /// Quaternion of a body 3-2-1 Euler rotation
    pub fn from_euler321(euler: &Euler321) -> Quat {
        euler.to_quat()
    }
}

impl Elements for Quat {
    fn elements(&self) -> Vec<Expr> {
        self.param.elements()
    }
}

/// Parameter vector `[w, x, y, z]` of a numeric unit quaternion
pub fn quaternion_to_param(q: &UnitQuaternion<f64>) -> [f64; 4] {
    [q.w, q.i, q.j, q.k]
}

/// Numeric unit quaternion from a parameter slice `[w, x, y, z]`
///
/// The parameters are renormalised. Returns `None` unless the slice holds
/// exactly four elements.
pub fn quaternion_from_param(param: &[f64]) -> Option<UnitQuaternion<f64>> {
    match *param {
        [w, x, y, z] => Some(UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))),
        _ => None,
    }
}
