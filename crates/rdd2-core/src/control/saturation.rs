//! Element-wise saturation, used for integrator anti-windup

use crate::sym::{Expr, SVec};

/// Clamp `x` element-wise into `[lower, upper]`
///
/// Equivalent to `max(lower, min(x, upper))`, written as two selects so the
/// generated code is branchless. When `lower > upper` the result is `lower`.
pub fn saturate<const N: usize>(x: &SVec<N>, lower: &SVec<N>, upper: &SVec<N>) -> SVec<N> {
    let capped = x.zip_map(upper, |x, upper| Expr::select(&x.gt(upper), upper, x));
    capped.zip_map(lower, |m, lower| Expr::select(&m.lt(lower), lower, m))
}
