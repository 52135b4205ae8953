//! Symbolic expression substrate
//!
//! The control laws are written once over these types:
//! - [`Expr`]: scalar expression DAG with constant folding and `select`
//! - [`SVec`], [`SMat3`]: fixed-dimension vectors and matrices
//! - [`Function`]: named function with ordered named inputs and outputs,
//!   linearised into a [`Tape`] for evaluation and code generation

pub mod expr;
pub mod vector;
pub mod function;

pub use expr::{BinaryOp, Expr, Node, SymbolId, UnaryOp};
pub use vector::{Elements, SMat3, SVec, SVec3};
pub use function::{is_identifier, Function, Instruction, Port, Signal, Tape};
