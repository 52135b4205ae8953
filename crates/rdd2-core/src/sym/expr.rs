//! Scalar expression graph
//!
//! An [`Expr`] is a cheap-clone handle to an immutable node. Sharing a handle
//! shares the node, so the graph is a DAG and common subexpressions are
//! evaluated once when the graph is linearised into a tape.
//!
//! Control flow is expressed with [`Expr::select`], never with native
//! branching, so every derivation compiles to branchless code.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identity of a symbolic input vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u64);

impl SymbolId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Single-operand operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Abs,
    Not,
}

impl UnaryOp {
    /// Numeric semantics, shared by constant folding and the evaluator
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Asin => x.asin(),
            UnaryOp::Acos => x.acos(),
            UnaryOp::Atan => x.atan(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Not => truth(x == 0.0),
        }
    }
}

/// Two-operand operators
///
/// Comparisons and logical operators yield `1.0` for true and `0.0` for false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Atan2,
    Min,
    Max,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    And,
    Or,
}

impl BinaryOp {
    /// Numeric semantics, shared by constant folding and the evaluator
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Atan2 => a.atan2(b),
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Lt => truth(a < b),
            BinaryOp::Le => truth(a <= b),
            BinaryOp::Gt => truth(a > b),
            BinaryOp::Ge => truth(a >= b),
            BinaryOp::Eq => truth(a == b),
            BinaryOp::And => truth(a != 0.0 && b != 0.0),
            BinaryOp::Or => truth(a != 0.0 || b != 0.0),
        }
    }

    fn infix(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("+"),
            BinaryOp::Sub => Some("-"),
            BinaryOp::Mul => Some("*"),
            BinaryOp::Div => Some("/"),
            BinaryOp::Lt => Some("<"),
            BinaryOp::Le => Some("<="),
            BinaryOp::Gt => Some(">"),
            BinaryOp::Ge => Some(">="),
            BinaryOp::Eq => Some("=="),
            BinaryOp::And => Some("&&"),
            BinaryOp::Or => Some("||"),
            BinaryOp::Atan2 | BinaryOp::Min | BinaryOp::Max => None,
        }
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Graph node
#[derive(Debug)]
pub enum Node {
    Constant(f64),
    /// Element `index` of the symbolic input vector `id`
    Symbol {
        id: SymbolId,
        name: Rc<str>,
        index: usize,
    },
    Unary(UnaryOp, Expr),
    Binary(BinaryOp, Expr, Expr),
    /// `if_true` where `condition != 0`, else `if_false`
    Select {
        condition: Expr,
        if_true: Expr,
        if_false: Expr,
    },
}

/// Symbolic scalar
#[derive(Clone)]
pub struct Expr(Rc<Node>);

impl Expr {
    fn from_node(node: Node) -> Self {
        Self(Rc::new(node))
    }

    pub fn constant(value: f64) -> Self {
        Self::from_node(Node::Constant(value))
    }

    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    pub fn one() -> Self {
        Self::constant(1.0)
    }

    /// A fresh scalar symbol
    pub fn symbol(name: &str) -> Self {
        Self::symbol_element(SymbolId::fresh(), Rc::from(name), 0)
    }

    pub(crate) fn symbol_element(id: SymbolId, name: Rc<str>, index: usize) -> Self {
        Self::from_node(Node::Symbol { id, name, index })
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Identity of the underlying node, stable while any handle is alive
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self.node() {
            Node::Constant(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.as_constant().is_some()
    }

    fn is_value(&self, value: f64) -> bool {
        self.as_constant() == Some(value)
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self.node(), Node::Symbol { .. })
    }

    pub fn unary(op: UnaryOp, arg: &Expr) -> Expr {
        if let Some(x) = arg.as_constant() {
            return Expr::constant(op.apply(x));
        }
        if op == UnaryOp::Neg {
            if let Node::Unary(UnaryOp::Neg, inner) = arg.node() {
                return inner.clone();
            }
        }
        Expr::from_node(Node::Unary(op, arg.clone()))
    }

    pub fn binary(op: BinaryOp, a: &Expr, b: &Expr) -> Expr {
        if let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) {
            return Expr::constant(op.apply(x, y));
        }
        match op {
            BinaryOp::Add if a.is_value(0.0) => return b.clone(),
            BinaryOp::Add if b.is_value(0.0) => return a.clone(),
            BinaryOp::Sub if b.is_value(0.0) => return a.clone(),
            BinaryOp::Sub if a.is_value(0.0) => return Expr::unary(UnaryOp::Neg, b),
            BinaryOp::Mul if a.is_value(0.0) || b.is_value(0.0) => return Expr::zero(),
            BinaryOp::Mul if a.is_value(1.0) => return b.clone(),
            BinaryOp::Mul if b.is_value(1.0) => return a.clone(),
            BinaryOp::Mul if a.is_value(-1.0) => return Expr::unary(UnaryOp::Neg, b),
            BinaryOp::Mul if b.is_value(-1.0) => return Expr::unary(UnaryOp::Neg, a),
            BinaryOp::Div if a.is_value(0.0) => return Expr::zero(),
            BinaryOp::Div if b.is_value(1.0) => return a.clone(),
            _ => {}
        }
        Expr::from_node(Node::Binary(op, a.clone(), b.clone()))
    }

    /// Elementwise conditional: `if_true` where `condition` is nonzero
    pub fn select(condition: &Expr, if_true: &Expr, if_false: &Expr) -> Expr {
        if let Some(c) = condition.as_constant() {
            return if c != 0.0 {
                if_true.clone()
            } else {
                if_false.clone()
            };
        }
        if if_true.key() == if_false.key() {
            return if_true.clone();
        }
        Expr::from_node(Node::Select {
            condition: condition.clone(),
            if_true: if_true.clone(),
            if_false: if_false.clone(),
        })
    }

    pub fn sqrt(&self) -> Expr {
        Expr::unary(UnaryOp::Sqrt, self)
    }

    pub fn sin(&self) -> Expr {
        Expr::unary(UnaryOp::Sin, self)
    }

    pub fn cos(&self) -> Expr {
        Expr::unary(UnaryOp::Cos, self)
    }

    pub fn tan(&self) -> Expr {
        Expr::unary(UnaryOp::Tan, self)
    }

    pub fn asin(&self) -> Expr {
        Expr::unary(UnaryOp::Asin, self)
    }

    pub fn acos(&self) -> Expr {
        Expr::unary(UnaryOp::Acos, self)
    }

    pub fn atan(&self) -> Expr {
        Expr::unary(UnaryOp::Atan, self)
    }

    pub fn abs(&self) -> Expr {
        Expr::unary(UnaryOp::Abs, self)
    }

    pub fn not(&self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }

    pub fn squared(&self) -> Expr {
        self * self
    }

    /// Four-quadrant arctangent of `self / x`
    pub fn atan2(&self, x: &Expr) -> Expr {
        Expr::binary(BinaryOp::Atan2, self, x)
    }

    pub fn min(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Min, self, other)
    }

    pub fn max(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Max, self, other)
    }

    pub fn lt(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Lt, self, other)
    }

    pub fn le(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Le, self, other)
    }

    pub fn gt(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Gt, self, other)
    }

    pub fn ge(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Ge, self, other)
    }

    pub fn equals(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Eq, self, other)
    }

    pub fn and(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::And, self, other)
    }

    pub fn or(&self, other: &Expr) -> Expr {
        Expr::binary(BinaryOp::Or, self, other)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Constant(v) => write!(f, "{}", v),
            Node::Symbol { name, index, .. } => write!(f, "{}[{}]", name, index),
            Node::Unary(UnaryOp::Neg, a) => write!(f, "(-{})", a),
            Node::Unary(UnaryOp::Not, a) => write!(f, "(!{})", a),
            Node::Unary(op, a) => write!(f, "{:?}({})", op, a),
            Node::Binary(op, a, b) => match op.infix() {
                Some(sym) => write!(f, "({} {} {})", a, sym, b),
                None => write!(f, "{:?}({}, {})", op, a, b),
            },
            Node::Select {
                condition,
                if_true,
                if_false,
            } => write!(f, "({} ? {} : {})", condition, if_true, if_false),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, &self, &rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, &self, rhs)
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, &rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, &self, &Expr::constant(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, &Expr::constant(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, &Expr::constant(self), &rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, &Expr::constant(self), rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, &self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}
