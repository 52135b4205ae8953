//! Quaternion and body 3-2-1 Euler conversions as standalone functions

use crate::error::GraphError;
use crate::math::{Euler321, Quat};
use crate::sym::{Expr, Function, Signal};

pub const QUAT_TO_EULER_NAME: &str = "quat_to_eulerB321";
pub const EULER_TO_QUAT_NAME: &str = "eulerB321_to_quat";

/// `quat_to_eulerB321(q_wb) -> (yaw, pitch, roll)`
pub fn derive_quat_to_euler() -> Result<Function, GraphError> {
    let q = Quat::symbol("q_wb");
    let euler = q.to_euler321();

    Function::new(
        QUAT_TO_EULER_NAME,
        vec![Signal::new("q_wb", &q)],
        vec![
            Signal::new("yaw", euler.yaw()),
            Signal::new("pitch", euler.pitch()),
            Signal::new("roll", euler.roll()),
        ],
    )
}

/// `eulerB321_to_quat(yaw, pitch, roll) -> q`
pub fn derive_euler_to_quat() -> Result<Function, GraphError> {
    let yaw = Expr::symbol("yaw");
    let pitch = Expr::symbol("pitch");
    let roll = Expr::symbol("roll");
    let q = Euler321::new(yaw.clone(), pitch.clone(), roll.clone()).to_quat();

    Function::new(
        EULER_TO_QUAT_NAME,
        vec![
            Signal::new("yaw", &yaw),
            Signal::new("pitch", &pitch),
            Signal::new("roll", &roll),
        ],
        vec![Signal::new("q", &q)],
    )
}
