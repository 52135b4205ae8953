//! Closed set of orientation representations
//!
//! [`Orientation`] is the capability interface the control laws program
//! against. Operations are carried out on the quaternion form and the result
//! is returned in the representation of the receiver.

use super::euler::Euler321;
use super::quaternion::Quat;
use crate::sym::{Elements, Expr, SMat3, SVec3};

/// Orientation as a tagged representation
#[derive(Debug, Clone)]
pub enum Orientation {
    Quat(Quat),
    Euler(Euler321),
}

impl Orientation {
    pub fn to_quat(&self) -> Quat {
        match self {
            Orientation::Quat(q) => q.clone(),
            Orientation::Euler(e) => e.to_quat(),
        }
    }

    pub fn to_euler(&self) -> Euler321 {
        match self {
            Orientation::Quat(q) => q.to_euler321(),
            Orientation::Euler(e) => e.clone(),
        }
    }

    /// Rotation matrix, body to world
    pub fn to_matrix(&self) -> SMat3 {
        match self {
            Orientation::Quat(q) => q.to_matrix(),
            Orientation::Euler(e) => e.to_matrix(),
        }
    }

    /// Logarithm map to a body angular displacement
    pub fn log(&self) -> SVec3 {
        self.to_quat().log()
    }

    pub fn inverse(&self) -> Orientation {
        self.rewrap(self.to_quat().inverse())
    }

    /// Group composition `self ∘ rhs`
    pub fn compose(&self, rhs: &Orientation) -> Orientation {
        self.rewrap(self.to_quat().compose(&rhs.to_quat()))
    }

    fn rewrap(&self, q: Quat) -> Orientation {
        match self {
            Orientation::Quat(_) => Orientation::Quat(q),
            Orientation::Euler(_) => Orientation::Euler(q.to_euler321()),
        }
    }
}

impl From<Quat> for Orientation {
    fn from(q: Quat) -> Self {
        Orientation::Quat(q)
    }
}

impl From<Euler321> for Orientation {
    fn from(e: Euler321) -> Self {
        Orientation::Euler(e)
    }
}

impl Elements for Orientation {
    fn elements(&self) -> Vec<Expr> {
        match self {
            Orientation::Quat(q) => q.elements(),
            Orientation::Euler(e) => e.elements(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::{Function, SVec, Signal};
    use approx::assert_relative_eq;

    #[test]
    fn test_relative_log_agrees_across_representations() {
        let e1 = Euler321::from_param(SVec::symbol("e1"));
        let e2 = Euler321::from_param(SVec::symbol("e2"));
        let as_euler = Orientation::from(e1.clone())
            .inverse()
            .compose(&Orientation::from(e2.clone()))
            .log();
        let as_quat = Orientation::from(e1.to_quat())
            .inverse()
            .compose(&Orientation::from(e2.to_quat()))
            .log();

        let f = Function::new(
            "f",
            vec![Signal::new("e1", &e1), Signal::new("e2", &e2)],
            vec![Signal::new("a", &as_euler), Signal::new("b", &as_quat)],
        )
        .unwrap();

        let out = f.call(&[&[0.2, 0.1, -0.3], &[0.5, -0.2, 0.1]]).unwrap();
        for i in 0..3 {
            assert_relative_eq!(out[0][i], out[1][i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_compose_keeps_receiver_representation() {
        let e = Orientation::from(Euler321::from_param(SVec::symbol("e")));
        let q = Orientation::from(Quat::symbol("q"));

        assert!(matches!(e.compose(&q), Orientation::Euler(_)));
        assert!(matches!(q.compose(&e), Orientation::Quat(_)));
    }

    #[test]
    fn test_euler_round_trip_through_orientation() {
        let e = Euler321::from_param(SVec::symbol("e"));
        let back = Orientation::Quat(Orientation::from(e.clone()).to_quat()).to_euler();
        let f = Function::new("f", vec![Signal::new("e", &e)], vec![Signal::new("e2", &back)])
            .unwrap();

        let input = [2.5, -1.2, 3.0];
        let out = f.call(&[&input]).unwrap().remove(0);
        for i in 0..3 {
            assert_relative_eq!(out[i], input[i], epsilon = 1e-9);
        }
    }
}
