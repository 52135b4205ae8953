//! rdd2 Code Generation
//!
//! Turns the control laws derived by `rdd2-core` into freestanding C for the
//! flight firmware.
//!
//! # Pipeline
//!
//! ```text
//! LawConfig --derive--> LawRegistry --add--> CodeGenerator --generate--> rdd2.c, rdd2.h
//! ```
//!
//! # Components
//!
//! - [`registry`]: Named collection of derived laws
//! - [`options`]: Backend options
//! - [`emitter`]: Per-function C emission
//! - [`generator`]: Batch rendering and file output
//! - [`driver`]: One-call generation of every law

pub mod driver;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod options;
pub mod registry;

// Re-exports
pub use driver::{generate_laws, generate_laws_with, DriverError};
pub use error::CodegenError;
pub use generator::{CodeGenerator, GeneratedSource};
pub use options::CodegenOptions;
pub use registry::{LawRegistry, RegistryError};
