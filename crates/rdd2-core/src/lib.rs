//! # rdd2 Core
//!
//! Cascaded multirotor flight-control laws, derived symbolically.
//!
//! Each law is built as an expression graph over named inputs and frozen into
//! a [`sym::Function`]. The same function can be evaluated on the host or
//! handed to the `rdd2-codegen` crate to be emitted as C.
//!
//! ## Modules
//!
//! - [`sym`]: Scalar expression graph, fixed-size vectors, named functions
//! - [`math`]: Orientation representations (quaternion, body 3-2-1 Euler)
//! - [`control`]: Manual mappers, attitude, attitude rate and position laws
//! - [`config`]: Gains and limits
//! - [`error`]: Error types

pub mod config;
pub mod control;
pub mod error;
pub mod math;
pub mod sym;

pub use config::LawConfig;
pub use error::{ConfigError, GraphError};
pub use sym::Function;
