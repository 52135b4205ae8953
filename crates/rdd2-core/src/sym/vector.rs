//! Fixed-dimension symbolic vectors and 3x3 matrices
//!
//! The dimension of an [`SVec`] is part of its type, so combining vectors of
//! different size is rejected by the compiler rather than at derivation time.

use std::ops::{Add, Div, Index, Mul, Neg, Sub};
use std::rc::Rc;

use super::expr::{Expr, SymbolId};

/// Types that flatten into an ordered list of scalar expressions
pub trait Elements {
    fn elements(&self) -> Vec<Expr>;
}

impl Elements for Expr {
    fn elements(&self) -> Vec<Expr> {
        vec![self.clone()]
    }
}

/// Symbolic column vector of dimension `N`
#[derive(Clone, Debug)]
pub struct SVec<const N: usize>([Expr; N]);

/// Symbolic 3-vector
pub type SVec3 = SVec<3>;

impl<const N: usize> SVec<N> {
    pub fn new(elements: [Expr; N]) -> Self {
        Self(elements)
    }

    /// A fresh symbolic vector named `name`
    pub fn symbol(name: &str) -> Self {
        let id = SymbolId::fresh();
        let name: Rc<str> = Rc::from(name);
        Self(std::array::from_fn(|i| {
            Expr::symbol_element(id, name.clone(), i)
        }))
    }

    pub fn from_f64(values: [f64; N]) -> Self {
        Self(values.map(Expr::constant))
    }

    pub fn zeros() -> Self {
        Self(std::array::from_fn(|_| Expr::zero()))
    }

    pub fn as_array(&self) -> &[Expr; N] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.0.iter()
    }

    pub fn map(&self, f: impl Fn(&Expr) -> Expr) -> Self {
        Self(std::array::from_fn(|i| f(&self.0[i])))
    }

    pub fn zip_map(&self, other: &Self, f: impl Fn(&Expr, &Expr) -> Expr) -> Self {
        Self(std::array::from_fn(|i| f(&self.0[i], &other.0[i])))
    }

    /// Elementwise product
    pub fn component_mul(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn dot(&self, other: &Self) -> Expr {
        self.iter()
            .zip(other.iter())
            .fold(Expr::zero(), |acc, (a, b)| acc + a * b)
    }

    pub fn norm_squared(&self) -> Expr {
        self.dot(self)
    }

    /// Euclidean norm
    pub fn norm(&self) -> Expr {
        self.norm_squared().sqrt()
    }

    /// Elementwise conditional sharing one scalar condition
    pub fn select(condition: &Expr, if_true: &Self, if_false: &Self) -> Self {
        if_true.zip_map(if_false, |a, b| Expr::select(condition, a, b))
    }
}

impl SVec<3> {
    pub fn x(&self) -> &Expr {
        &self.0[0]
    }

    pub fn y(&self) -> &Expr {
        &self.0[1]
    }

    pub fn z(&self) -> &Expr {
        &self.0[2]
    }

    pub fn cross(&self, other: &Self) -> Self {
        let [a1, a2, a3] = &self.0;
        let [b1, b2, b3] = &other.0;
        Self([a2 * b3 - a3 * b2, a3 * b1 - a1 * b3, a1 * b2 - a2 * b1])
    }

    pub fn x_axis() -> Self {
        Self::from_f64([1.0, 0.0, 0.0])
    }

    pub fn y_axis() -> Self {
        Self::from_f64([0.0, 1.0, 0.0])
    }

    pub fn z_axis() -> Self {
        Self::from_f64([0.0, 0.0, 1.0])
    }
}

impl<const N: usize> Elements for SVec<N> {
    fn elements(&self) -> Vec<Expr> {
        self.0.to_vec()
    }
}

impl<const N: usize> Index<usize> for SVec<N> {
    type Output = Expr;

    fn index(&self, index: usize) -> &Expr {
        &self.0[index]
    }
}

impl<const N: usize> Add<&SVec<N>> for &SVec<N> {
    type Output = SVec<N>;
    fn add(self, rhs: &SVec<N>) -> SVec<N> {
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl<const N: usize> Add<SVec<N>> for SVec<N> {
    type Output = SVec<N>;
    fn add(self, rhs: SVec<N>) -> SVec<N> {
        &self + &rhs
    }
}

impl<const N: usize> Sub<&SVec<N>> for &SVec<N> {
    type Output = SVec<N>;
    fn sub(self, rhs: &SVec<N>) -> SVec<N> {
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl<const N: usize> Sub<SVec<N>> for SVec<N> {
    type Output = SVec<N>;
    fn sub(self, rhs: SVec<N>) -> SVec<N> {
        &self - &rhs
    }
}

impl<const N: usize> Neg for &SVec<N> {
    type Output = SVec<N>;
    fn neg(self) -> SVec<N> {
        self.map(|a| -a)
    }
}

impl<const N: usize> Neg for SVec<N> {
    type Output = SVec<N>;
    fn neg(self) -> SVec<N> {
        -&self
    }
}

impl<const N: usize> Mul<f64> for &SVec<N> {
    type Output = SVec<N>;
    fn mul(self, rhs: f64) -> SVec<N> {
        self.map(|a| a * rhs)
    }
}

impl<const N: usize> Mul<f64> for SVec<N> {
    type Output = SVec<N>;
    fn mul(self, rhs: f64) -> SVec<N> {
        &self * rhs
    }
}

impl<const N: usize> Mul<&Expr> for &SVec<N> {
    type Output = SVec<N>;
    fn mul(self, rhs: &Expr) -> SVec<N> {
        self.map(|a| a * rhs)
    }
}

impl<const N: usize> Mul<&Expr> for SVec<N> {
    type Output = SVec<N>;
    fn mul(self, rhs: &Expr) -> SVec<N> {
        &self * rhs
    }
}

impl<const N: usize> Div<f64> for &SVec<N> {
    type Output = SVec<N>;
    fn div(self, rhs: f64) -> SVec<N> {
        self.map(|a| a / rhs)
    }
}

impl<const N: usize> Div<f64> for SVec<N> {
    type Output = SVec<N>;
    fn div(self, rhs: f64) -> SVec<N> {
        &self / rhs
    }
}

impl<const N: usize> Div<&Expr> for &SVec<N> {
    type Output = SVec<N>;
    fn div(self, rhs: &Expr) -> SVec<N> {
        self.map(|a| a / rhs)
    }
}

impl<const N: usize> Div<&Expr> for SVec<N> {
    type Output = SVec<N>;
    fn div(self, rhs: &Expr) -> SVec<N> {
        &self / rhs
    }
}

/// Symbolic 3x3 matrix, stored by column
#[derive(Clone, Debug)]
pub struct SMat3 {
    columns: [SVec3; 3],
}

impl SMat3 {
    pub fn from_columns(columns: [SVec3; 3]) -> Self {
        Self { columns }
    }

    /// Build from row-major entries
    pub fn from_rows(rows: [[Expr; 3]; 3]) -> Self {
        Self {
            columns: std::array::from_fn(|c| {
                SVec::new(std::array::from_fn(|r| rows[r][c].clone()))
            }),
        }
    }

    pub fn identity() -> Self {
        Self::from_columns([SVec3::x_axis(), SVec3::y_axis(), SVec3::z_axis()])
    }

    /// Entry at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> &Expr {
        &self.columns[col][row]
    }

    pub fn column(&self, col: usize) -> &SVec3 {
        &self.columns[col]
    }

    pub fn transpose(&self) -> Self {
        Self::from_columns(std::array::from_fn(|c| {
            SVec::new(std::array::from_fn(|r| self.get(c, r).clone()))
        }))
    }

    pub fn trace(&self) -> Expr {
        self.get(0, 0) + self.get(1, 1) + self.get(2, 2)
    }

    pub fn mul_vec(&self, v: &SVec3) -> SVec3 {
        (0..3).fold(SVec3::zeros(), |acc, c| &acc + &(&self.columns[c] * &v[c]))
    }
}

impl Elements for SMat3 {
    fn elements(&self) -> Vec<Expr> {
        self.columns.iter().flat_map(|c| c.elements()).collect()
    }
}
